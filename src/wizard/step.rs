//! Registration wizard steps

/// Wizard step enumeration, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WizardStep {
    BusinessInfo,
    Address,
    BankDetails,
    Contacts,
    Staff,
    Images,
}

impl WizardStep {
    pub fn all() -> &'static [WizardStep] {
        &[
            WizardStep::BusinessInfo,
            WizardStep::Address,
            WizardStep::BankDetails,
            WizardStep::Contacts,
            WizardStep::Staff,
            WizardStep::Images,
        ]
    }

    /// Number of steps before the terminal submitted state
    pub fn count() -> usize {
        Self::all().len()
    }

    /// Zero-based position
    pub fn index(&self) -> usize {
        match self {
            WizardStep::BusinessInfo => 0,
            WizardStep::Address => 1,
            WizardStep::BankDetails => 2,
            WizardStep::Contacts => 3,
            WizardStep::Staff => 4,
            WizardStep::Images => 5,
        }
    }

    pub fn from_index(index: usize) -> Option<WizardStep> {
        Self::all().get(index).copied()
    }

    pub fn is_last(&self) -> bool {
        self.index() + 1 == Self::count()
    }

    /// Short machine name, used as a key in JSON reports
    pub fn key(&self) -> &'static str {
        match self {
            WizardStep::BusinessInfo => "business",
            WizardStep::Address => "address",
            WizardStep::BankDetails => "bankAccounts",
            WizardStep::Contacts => "contacts",
            WizardStep::Staff => "staff",
            WizardStep::Images => "images",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::BusinessInfo => "Business Information",
            WizardStep::Address => "Address",
            WizardStep::BankDetails => "Bank Details",
            WizardStep::Contacts => "Contact Persons",
            WizardStep::Staff => "Staff",
            WizardStep::Images => "Images & Documents",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            WizardStep::BusinessInfo => "Legal identity, business type and how guests reach you",
            WizardStep::Address => "Where the property is located",
            WizardStep::BankDetails => "Accounts that receive payouts (one primary)",
            WizardStep::Contacts => "People we can contact about this business (one primary)",
            WizardStep::Staff => "Staff working at the property (optional)",
            WizardStep::Images => "Property photos, cover image and owner identification",
        }
    }

    /// Embedded schema file validating this step
    pub fn schema_file(&self) -> &'static str {
        match self {
            WizardStep::BusinessInfo => "business_info.schema.json",
            WizardStep::Address => "address.schema.json",
            WizardStep::BankDetails => "bank_details.schema.json",
            WizardStep::Contacts => "contacts.schema.json",
            WizardStep::Staff => "staff.schema.json",
            WizardStep::Images => "attachments.schema.json",
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}
