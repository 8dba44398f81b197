// Entity Models
// "Identity persists, values change"
//
// The registry hands us every value a company ever had; entities here are the
// flattened snapshot of those values as of one reference date.

pub mod organization;

pub use organization::{
    Address, CompanyType, CreditStatus, EmploymentRange, Industries, Industry, Municipality,
    OrganizationRecord,
};
