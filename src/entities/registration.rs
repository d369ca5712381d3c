//! Business registration form
//!
//! The aggregate record edited by the registration wizard. Every field is a
//! plain string so a half-filled form is representable; the step validators
//! decide what is acceptable. Keys serialize in camelCase, which is also the
//! shape the backend expects and the shape validation error paths use.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::entities::address::{AddressChain, ParishSelection};

/// Identity and contact fields of the business
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BusinessInfo {
    pub legal_name: String,
    pub trading_name: String,
    pub business_type_id: String,
    pub ownership_type_id: String,
    pub registration_number: String,
    /// `YYYY-MM-DD`
    pub registration_date: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub website: String,
}

/// Editable fields of [`BusinessInfo`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusinessField {
    LegalName,
    TradingName,
    BusinessTypeId,
    OwnershipTypeId,
    RegistrationNumber,
    RegistrationDate,
    ContactPhone,
    ContactEmail,
    Website,
}

impl BusinessField {
    pub fn all() -> &'static [BusinessField] {
        &[
            BusinessField::LegalName,
            BusinessField::TradingName,
            BusinessField::BusinessTypeId,
            BusinessField::OwnershipTypeId,
            BusinessField::RegistrationNumber,
            BusinessField::RegistrationDate,
            BusinessField::ContactPhone,
            BusinessField::ContactEmail,
            BusinessField::Website,
        ]
    }

    /// Serialized key, also the validation path
    pub fn key(&self) -> &'static str {
        match self {
            BusinessField::LegalName => "legalName",
            BusinessField::TradingName => "tradingName",
            BusinessField::BusinessTypeId => "businessTypeId",
            BusinessField::OwnershipTypeId => "ownershipTypeId",
            BusinessField::RegistrationNumber => "registrationNumber",
            BusinessField::RegistrationDate => "registrationDate",
            BusinessField::ContactPhone => "contactPhone",
            BusinessField::ContactEmail => "contactEmail",
            BusinessField::Website => "website",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BusinessField::LegalName => "Legal name",
            BusinessField::TradingName => "Trading name",
            BusinessField::BusinessTypeId => "Business type",
            BusinessField::OwnershipTypeId => "Ownership type",
            BusinessField::RegistrationNumber => "Registration number",
            BusinessField::RegistrationDate => "Registration date (YYYY-MM-DD)",
            BusinessField::ContactPhone => "Contact phone",
            BusinessField::ContactEmail => "Contact email",
            BusinessField::Website => "Website",
        }
    }

    pub fn is_phone(&self) -> bool {
        matches!(self, BusinessField::ContactPhone)
    }
}

impl BusinessInfo {
    pub fn get(&self, field: BusinessField) -> &str {
        match field {
            BusinessField::LegalName => &self.legal_name,
            BusinessField::TradingName => &self.trading_name,
            BusinessField::BusinessTypeId => &self.business_type_id,
            BusinessField::OwnershipTypeId => &self.ownership_type_id,
            BusinessField::RegistrationNumber => &self.registration_number,
            BusinessField::RegistrationDate => &self.registration_date,
            BusinessField::ContactPhone => &self.contact_phone,
            BusinessField::ContactEmail => &self.contact_email,
            BusinessField::Website => &self.website,
        }
    }

    pub fn set(&mut self, field: BusinessField, value: String) {
        let slot = match field {
            BusinessField::LegalName => &mut self.legal_name,
            BusinessField::TradingName => &mut self.trading_name,
            BusinessField::BusinessTypeId => &mut self.business_type_id,
            BusinessField::OwnershipTypeId => &mut self.ownership_type_id,
            BusinessField::RegistrationNumber => &mut self.registration_number,
            BusinessField::RegistrationDate => &mut self.registration_date,
            BusinessField::ContactPhone => &mut self.contact_phone,
            BusinessField::ContactEmail => &mut self.contact_email,
            BusinessField::Website => &mut self.website,
        };
        *slot = value;
    }

    /// Trading name when set, otherwise the legal name
    pub fn display_name(&self) -> &str {
        if self.trading_name.trim().is_empty() {
            &self.legal_name
        } else {
            &self.trading_name
        }
    }
}

/// Address fields; the ids are only set when the parish matched the hierarchy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddressFields {
    pub region_id: String,
    pub region_name: String,
    pub district_id: String,
    pub district_name: String,
    pub county_id: String,
    pub county_name: String,
    pub sub_county_id: String,
    pub sub_county_name: String,
    pub parish_id: String,
    pub parish_name: String,
    pub physical_address: String,
}

impl AddressFields {
    /// Apply a parish selection: a match fills the whole chain, free text
    /// clears every dependent field and keeps the raw name
    pub fn apply_parish(&mut self, selection: &ParishSelection) {
        match selection {
            ParishSelection::Matched(chain) => self.fill_from_chain(chain),
            ParishSelection::FreeText(text) => {
                self.fill_from_chain(&AddressChain::default());
                self.parish_name = text.clone();
            }
        }
    }

    fn fill_from_chain(&mut self, chain: &AddressChain) {
        self.region_id = chain.region.id.clone();
        self.region_name = chain.region.name.clone();
        self.district_id = chain.district.id.clone();
        self.district_name = chain.district.name.clone();
        self.county_id = chain.county.id.clone();
        self.county_name = chain.county.name.clone();
        self.sub_county_id = chain.sub_county.id.clone();
        self.sub_county_name = chain.sub_county.name.clone();
        self.parish_id = chain.parish.id.clone();
        self.parish_name = chain.parish.name.clone();
    }

    /// Whether the parish was matched against the reference hierarchy
    pub fn parish_is_verified(&self) -> bool {
        !self.parish_id.is_empty()
    }
}

/// Entries that carry an exclusive "primary" flag
pub trait Primary {
    fn is_primary(&self) -> bool;
    fn set_primary(&mut self, primary: bool);
}

/// A payout bank account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BankAccount {
    pub bank_id: String,
    pub account_name: String,
    pub account_number: String,
    pub account_type_id: String,
    pub branch: String,
    pub currency: String,
    pub is_primary: bool,
}

impl Default for BankAccount {
    fn default() -> Self {
        Self {
            bank_id: String::new(),
            account_name: String::new(),
            account_number: String::new(),
            account_type_id: String::new(),
            branch: String::new(),
            currency: "UGX".to_string(),
            is_primary: false,
        }
    }
}

/// Editable fields of [`BankAccount`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankField {
    BankId,
    AccountName,
    AccountNumber,
    AccountTypeId,
    Branch,
    Currency,
}

impl BankField {
    pub fn all() -> &'static [BankField] {
        &[
            BankField::BankId,
            BankField::AccountName,
            BankField::AccountNumber,
            BankField::AccountTypeId,
            BankField::Branch,
            BankField::Currency,
        ]
    }

    pub fn key(&self) -> &'static str {
        match self {
            BankField::BankId => "bankId",
            BankField::AccountName => "accountName",
            BankField::AccountNumber => "accountNumber",
            BankField::AccountTypeId => "accountTypeId",
            BankField::Branch => "branch",
            BankField::Currency => "currency",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BankField::BankId => "Bank",
            BankField::AccountName => "Account name",
            BankField::AccountNumber => "Account number",
            BankField::AccountTypeId => "Account type",
            BankField::Branch => "Branch",
            BankField::Currency => "Currency",
        }
    }
}

impl BankAccount {
    pub fn get(&self, field: BankField) -> &str {
        match field {
            BankField::BankId => &self.bank_id,
            BankField::AccountName => &self.account_name,
            BankField::AccountNumber => &self.account_number,
            BankField::AccountTypeId => &self.account_type_id,
            BankField::Branch => &self.branch,
            BankField::Currency => &self.currency,
        }
    }

    pub fn set(&mut self, field: BankField, value: String) {
        match field {
            BankField::BankId => self.bank_id = value,
            BankField::AccountName => self.account_name = value,
            BankField::AccountNumber => self.account_number = value,
            BankField::AccountTypeId => self.account_type_id = value,
            BankField::Branch => self.branch = value,
            BankField::Currency => self.currency = value,
        }
    }
}

impl Primary for BankAccount {
    fn is_primary(&self) -> bool {
        self.is_primary
    }

    fn set_primary(&mut self, primary: bool) {
        self.is_primary = primary;
    }
}

/// A contact person for the business
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Contact {
    pub name: String,
    pub position: String,
    pub phone: String,
    pub email: String,
    pub is_primary: bool,
}

/// Editable fields of [`Contact`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Name,
    Position,
    Phone,
    Email,
}

impl ContactField {
    pub fn all() -> &'static [ContactField] {
        &[
            ContactField::Name,
            ContactField::Position,
            ContactField::Phone,
            ContactField::Email,
        ]
    }

    pub fn key(&self) -> &'static str {
        match self {
            ContactField::Name => "name",
            ContactField::Position => "position",
            ContactField::Phone => "phone",
            ContactField::Email => "email",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ContactField::Name => "Name",
            ContactField::Position => "Position",
            ContactField::Phone => "Phone",
            ContactField::Email => "Email",
        }
    }

    pub fn is_phone(&self) -> bool {
        matches!(self, ContactField::Phone)
    }
}

impl Contact {
    pub fn get(&self, field: ContactField) -> &str {
        match field {
            ContactField::Name => &self.name,
            ContactField::Position => &self.position,
            ContactField::Phone => &self.phone,
            ContactField::Email => &self.email,
        }
    }

    pub fn set(&mut self, field: ContactField, value: String) {
        match field {
            ContactField::Name => self.name = value,
            ContactField::Position => self.position = value,
            ContactField::Phone => self.phone = value,
            ContactField::Email => self.email = value,
        }
    }
}

impl Primary for Contact {
    fn is_primary(&self) -> bool {
        self.is_primary
    }

    fn set_primary(&mut self, primary: bool) {
        self.is_primary = primary;
    }
}

/// A staff member working at the property
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StaffMember {
    pub full_name: String,
    pub role: String,
    pub phone: String,
    pub email: String,
}

/// Staff roles accepted by the backend
pub const STAFF_ROLES: &[&str] = &[
    "MANAGER",
    "RECEPTIONIST",
    "HOUSEKEEPING",
    "CHEF",
    "SECURITY",
    "MAINTENANCE",
    "OTHER",
];

/// Editable fields of [`StaffMember`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffField {
    FullName,
    Role,
    Phone,
    Email,
}

impl StaffField {
    pub fn all() -> &'static [StaffField] {
        &[
            StaffField::FullName,
            StaffField::Role,
            StaffField::Phone,
            StaffField::Email,
        ]
    }

    pub fn key(&self) -> &'static str {
        match self {
            StaffField::FullName => "fullName",
            StaffField::Role => "role",
            StaffField::Phone => "phone",
            StaffField::Email => "email",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StaffField::FullName => "Full name",
            StaffField::Role => "Role",
            StaffField::Phone => "Phone",
            StaffField::Email => "Email",
        }
    }

    pub fn is_phone(&self) -> bool {
        matches!(self, StaffField::Phone)
    }
}

impl StaffMember {
    pub fn get(&self, field: StaffField) -> &str {
        match field {
            StaffField::FullName => &self.full_name,
            StaffField::Role => &self.role,
            StaffField::Phone => &self.phone,
            StaffField::Email => &self.email,
        }
    }

    pub fn set(&mut self, field: StaffField, value: String) {
        match field {
            StaffField::FullName => self.full_name = value,
            StaffField::Role => self.role = value,
            StaffField::Phone => self.phone = value,
            StaffField::Email => self.email = value,
        }
    }
}

/// Non-image attachments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Attachments {
    /// National identification number of the owner
    pub owner_nin: String,
    /// Optional scanned trading licence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_document: Option<PathBuf>,
}

/// Editable fields of [`Attachments`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentField {
    OwnerNin,
    LicenseDocument,
}

impl AttachmentField {
    pub fn key(&self) -> &'static str {
        match self {
            AttachmentField::OwnerNin => "ownerNin",
            AttachmentField::LicenseDocument => "licenseDocument",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AttachmentField::OwnerNin => "Owner NIN",
            AttachmentField::LicenseDocument => "Licence document (path)",
        }
    }
}

impl Attachments {
    pub fn set(&mut self, field: AttachmentField, value: String) {
        match field {
            AttachmentField::OwnerNin => self.owner_nin = value.trim().to_uppercase(),
            AttachmentField::LicenseDocument => {
                self.license_document = if value.trim().is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value.trim()))
                };
            }
        }
    }

    pub fn license_path(&self) -> Option<&Path> {
        self.license_document.as_deref()
    }
}

/// The aggregate registration record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistrationForm {
    pub business: BusinessInfo,
    pub address: AddressFields,
    pub bank_accounts: Vec<BankAccount>,
    pub contacts: Vec<Contact>,
    pub staff: Vec<StaffMember>,
    pub attachments: Attachments,
}

impl RegistrationForm {
    /// Empty form as created when the wizard starts: one blank bank account
    /// and one blank contact, both primary
    pub fn new() -> Self {
        Self {
            bank_accounts: vec![BankAccount {
                is_primary: true,
                ..Default::default()
            }],
            contacts: vec![Contact {
                is_primary: true,
                ..Default::default()
            }],
            ..Default::default()
        }
    }
}
