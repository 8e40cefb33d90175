//! These structs provide the CLI interface for the billed CLI.

use crate::controller::UploadOrdering;
use crate::model::ExpenseType;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// billed: submit expense bills ("notes de frais") to a Billed bill store.
///
/// A bill is submitted in two steps, as the new bill form does it: the receipt is validated and
/// uploaded first, which creates a draft bill, then the draft is updated with the rest of the
/// bill. Receipts must be jpg, jpeg or png files.
///
/// Run `billed init` once, then `billed login` before submitting.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the billed home directory and its configuration file.
    Init(InitArgs),
    /// Store the employee session that bills are submitted as.
    Login(LoginArgs),
    /// Remove the stored session.
    Logout,
    /// Check whether a file would be accepted as a receipt.
    Validate(ValidateArgs),
    /// Upload a receipt and submit a new bill.
    Submit(Box<SubmitArgs>),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where billed configuration and session are held. Defaults to ~/billed
    #[arg(long, env = "BILLED_HOME", default_value_t = default_billed_home())]
    billed_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, billed_home: PathBuf) -> Self {
        Self {
            log_level,
            billed_home: billed_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn billed_home(&self) -> &DisplayPath {
        &self.billed_home
    }
}

/// Args for the `billed init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The base URL of the bill store. Defaults to http://localhost:5678
    #[arg(long)]
    api_url: Option<String>,
}

impl InitArgs {
    pub fn new(api_url: Option<String>) -> Self {
        Self { api_url }
    }

    pub fn api_url(&self) -> Option<&str> {
        self.api_url.as_deref()
    }
}

/// Args for the `billed login` command.
#[derive(Debug, Parser, Clone)]
pub struct LoginArgs {
    /// The employee's email address.
    #[arg(long)]
    email: String,

    /// The bearer token issued by the bill store at login, if it requires one.
    #[arg(long, env = "BILLED_JWT")]
    jwt: Option<String>,
}

impl LoginArgs {
    pub fn new(email: impl Into<String>, jwt: Option<String>) -> Self {
        Self {
            email: email.into(),
            jwt,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn jwt(&self) -> Option<&str> {
        self.jwt.as_deref()
    }
}

/// Args for the `billed validate` command.
#[derive(Debug, Parser, Clone)]
pub struct ValidateArgs {
    /// The receipt file to check. Only its name is looked at.
    file: PathBuf,
}

impl ValidateArgs {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

/// Args for the `billed submit` command.
#[derive(Debug, Parser, Clone)]
pub struct SubmitArgs {
    /// The receipt to attach (jpg, jpeg or png). Without it, the bill is sent without a receipt.
    #[arg(long)]
    file: Option<PathBuf>,

    /// The kind of expense.
    #[arg(long = "type", value_enum, default_value_t = ExpenseType::default())]
    expense_type: ExpenseType,

    /// A short name for the expense, e.g. "Vol Paris Londres".
    #[arg(long)]
    name: String,

    /// The amount including VAT, in whole euros.
    #[arg(long)]
    amount: String,

    /// The date of the expense, YYYY-MM-DD.
    #[arg(long)]
    date: NaiveDate,

    /// The VAT amount.
    #[arg(long, default_value = "")]
    vat: String,

    /// The VAT percentage. 20 is used when it is not a number.
    #[arg(long, default_value = "")]
    pct: String,

    /// Free text for the reviewer.
    #[arg(long, default_value = "")]
    commentary: String,

    /// Overrides the upload_ordering setting of config.json.
    #[arg(long, value_enum)]
    upload_ordering: Option<UploadOrdering>,
}

impl SubmitArgs {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        file: Option<PathBuf>,
        expense_type: ExpenseType,
        name: impl Into<String>,
        amount: impl Into<String>,
        date: NaiveDate,
        vat: impl Into<String>,
        pct: impl Into<String>,
        commentary: impl Into<String>,
    ) -> Self {
        Self {
            file,
            expense_type,
            name: name.into(),
            amount: amount.into(),
            date,
            vat: vat.into(),
            pct: pct.into(),
            commentary: commentary.into(),
            upload_ordering: None,
        }
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn expense_type(&self) -> ExpenseType {
        self.expense_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn vat(&self) -> &str {
        &self.vat
    }

    pub fn pct(&self) -> &str {
        &self.pct
    }

    pub fn commentary(&self) -> &str {
        &self.commentary
    }

    pub fn upload_ordering(&self) -> Option<UploadOrdering> {
        self.upload_ordering
    }
}

fn default_billed_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("billed"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --billed-home or BILLED_HOME instead of relying on the default \
                billed home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("billed")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_submit() {
        let args = Args::try_parse_from([
            "billed",
            "--billed-home",
            "/tmp/billed",
            "submit",
            "--file",
            "receipt.png",
            "--type",
            "hotel-et-logement",
            "--name",
            "encore",
            "--amount",
            "400",
            "--date",
            "2004-04-04",
            "--vat",
            "80",
        ])
        .unwrap();
        assert_eq!(args.common().billed_home().path(), Path::new("/tmp/billed"));
        assert_eq!(args.common().log_level(), LevelFilter::INFO);
        let Command::Submit(submit) = args.command() else {
            panic!("expected submit");
        };
        assert_eq!(submit.file(), Some(Path::new("receipt.png")));
        assert_eq!(submit.expense_type(), ExpenseType::HotelEtLogement);
        assert_eq!(submit.amount(), "400");
        assert_eq!(submit.date(), NaiveDate::from_ymd_opt(2004, 4, 4).unwrap());
        assert_eq!(submit.pct(), "");
        assert_eq!(submit.upload_ordering(), None);
    }

    #[test]
    fn test_parse_bad_date() {
        let result = Args::try_parse_from([
            "billed", "submit", "--name", "x", "--amount", "1", "--date", "04/04/2004",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_login_and_log_level() {
        let args = Args::try_parse_from([
            "billed",
            "--log-level",
            "debug",
            "login",
            "--email",
            "a@a",
        ])
        .unwrap();
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
        let Command::Login(login) = args.command() else {
            panic!("expected login");
        };
        assert_eq!(login.email(), "a@a");
    }
}
