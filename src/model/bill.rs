//! The bill payload that is sent to the store when the form is submitted.

use crate::model::{FormField, FormValues, PendingUpload};
use crate::utils::parse_int;
use serde::{Deserialize, Serialize};

/// The percentage used when the `pct` field is empty or is not a number. A `pct` of `0` is a
/// number and is kept as 0, it does not fall back to this default.
pub const DEFAULT_PCT: i64 = 20;

/// The status of a bill. Bills submitted from the new bill form always start out `Pending`; an
/// administrator later moves them to `Accepted` or `Refused`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    #[default]
    Pending,
    Accepted,
    Refused,
}

serde_plain::derive_display_from_serialize!(BillStatus);
serde_plain::derive_fromstr_from_deserialize!(BillStatus);

/// The expense types offered by the new bill form. The serialized value is the label that the
/// form's `expense-type` select submits.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum ExpenseType {
    #[default]
    #[serde(rename = "Transports")]
    Transports,
    #[serde(rename = "Restaurants et bars")]
    RestaurantsEtBars,
    #[serde(rename = "Hôtel et logement")]
    HotelEtLogement,
    #[serde(rename = "Services en ligne")]
    ServicesEnLigne,
    #[serde(rename = "IT et électronique")]
    ItEtElectronique,
    #[serde(rename = "Equipement et matériel")]
    EquipementEtMateriel,
    #[serde(rename = "Fournitures de bureau")]
    FournituresDeBureau,
}

serde_plain::derive_display_from_serialize!(ExpenseType);
serde_plain::derive_fromstr_from_deserialize!(ExpenseType);

/// The bill as it is sent to `BillStore::update_bill`. It is built fresh for each submit from the
/// current form values and a snapshot of the `PendingUpload`, and is never modified afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillPayload {
    email: String,
    #[serde(rename = "type")]
    expense_type: String,
    name: String,
    /// `None` when the amount field does not hold an integer. Serialized as `null`.
    amount: Option<i64>,
    date: String,
    vat: String,
    pct: i64,
    commentary: String,
    file_url: Option<String>,
    file_name: Option<String>,
    status: BillStatus,
}

impl BillPayload {
    /// Assembles a pending bill from the submitted form `values` and the `upload` snapshot taken
    /// at submit time. `file_url` and `file_name` stay `None` when no upload ever completed.
    pub fn new(email: impl Into<String>, values: &FormValues, upload: &PendingUpload) -> Self {
        Self {
            email: email.into(),
            expense_type: values.get(FormField::ExpenseType).to_string(),
            name: values.get(FormField::ExpenseName).to_string(),
            amount: parse_int(values.get(FormField::Amount)),
            date: values.get(FormField::Date).to_string(),
            vat: values.get(FormField::Vat).to_string(),
            pct: parse_int(values.get(FormField::Pct)).unwrap_or(DEFAULT_PCT),
            commentary: values.get(FormField::Commentary).to_string(),
            file_url: upload.file_url().map(str::to_string),
            file_name: upload.file_name().map(str::to_string),
            status: BillStatus::Pending,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn expense_type(&self) -> &str {
        &self.expense_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amount(&self) -> Option<i64> {
        self.amount
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn vat(&self) -> &str {
        &self.vat
    }

    pub fn pct(&self) -> i64 {
        self.pct
    }

    pub fn commentary(&self) -> &str {
        &self.commentary
    }

    pub fn file_url(&self) -> Option<&str> {
        self.file_url.as_deref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn status(&self) -> BillStatus {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn values(pct: &str) -> FormValues {
        FormValues::new()
            .with(FormField::ExpenseType, "Hôtel et logement")
            .with(FormField::ExpenseName, "encore")
            .with(FormField::Amount, "400")
            .with(FormField::Date, "2004-04-04")
            .with(FormField::Vat, "80")
            .with(FormField::Pct, pct)
            .with(FormField::Commentary, "séminaire billed")
    }

    #[test]
    fn test_payload_from_form_values() {
        let upload =
            PendingUpload::new("https://x/receipt.jpg", "receipt.jpg", "47qAXb6fIm2zOKkLzMro");
        let bill = BillPayload::new("a@a", &values("10"), &upload);
        assert_eq!(bill.email(), "a@a");
        assert_eq!(bill.expense_type(), "Hôtel et logement");
        assert_eq!(bill.name(), "encore");
        assert_eq!(bill.amount(), Some(400));
        assert_eq!(bill.date(), "2004-04-04");
        assert_eq!(bill.vat(), "80");
        assert_eq!(bill.pct(), 10);
        assert_eq!(bill.commentary(), "séminaire billed");
        assert_eq!(bill.file_url(), Some("https://x/receipt.jpg"));
        assert_eq!(bill.file_name(), Some("receipt.jpg"));
        assert_eq!(bill.status(), BillStatus::Pending);
    }

    #[test]
    fn test_pct_defaults_to_20() {
        let upload = PendingUpload::default();
        assert_eq!(BillPayload::new("a@a", &values(""), &upload).pct(), 20);
        assert_eq!(BillPayload::new("a@a", &values("abc"), &upload).pct(), 20);
        assert_eq!(BillPayload::new("a@a", &values("35"), &upload).pct(), 35);
        assert_eq!(BillPayload::new("a@a", &values("0"), &upload).pct(), 0);
    }

    #[test]
    fn test_unparsable_amount_is_null() {
        let form = values("20").with(FormField::Amount, "n/a");
        let bill = BillPayload::new("a@a", &form, &PendingUpload::default());
        assert_eq!(bill.amount(), None);
        let json = serde_json::to_value(&bill).unwrap();
        assert!(json["amount"].is_null());
    }

    #[test]
    fn test_payload_json_shape() {
        let bill = BillPayload::new("a@a", &values("20"), &PendingUpload::default());
        let json = serde_json::to_value(&bill).unwrap();
        assert_eq!(json["type"], "Hôtel et logement");
        assert_eq!(json["status"], "pending");
        assert!(json["fileUrl"].is_null());
        assert!(json["fileName"].is_null());
        assert_eq!(json["pct"], 20);
        assert_eq!(json["amount"], 400);
    }

    #[test]
    fn test_expense_type_labels() {
        assert_eq!(ExpenseType::HotelEtLogement.to_string(), "Hôtel et logement");
        assert_eq!(
            ExpenseType::from_str("Restaurants et bars").unwrap(),
            ExpenseType::RestaurantsEtBars
        );
        assert_eq!(BillStatus::Refused.to_string(), "refused");
    }
}
