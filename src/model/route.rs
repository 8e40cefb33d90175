use serde::{Deserialize, Serialize};

/// The pages of the application. The serialized value is the route path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    #[default]
    #[serde(rename = "")]
    Login,
    #[serde(rename = "#employee/bills")]
    Bills,
    #[serde(rename = "#employee/bill/new")]
    NewBill,
    #[serde(rename = "#admin/dashboard")]
    Dashboard,
}

serde_plain::derive_display_from_serialize!(Route);
serde_plain::derive_fromstr_from_deserialize!(Route);

#[test]
fn test_route_paths() {
    use std::str::FromStr;
    assert_eq!(Route::Bills.to_string(), "#employee/bills");
    assert_eq!(Route::Login.to_string(), "");
    assert_eq!(Route::from_str("#employee/bill/new").unwrap(), Route::NewBill);
}
