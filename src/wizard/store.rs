//! Step state store
//!
//! Every edit is a [`Patch`]. [`apply`] never mutates the form it is given:
//! it returns a new form with the patch merged in. Array slices (bank
//! accounts, contacts, staff) are edited by index and replaced as a whole,
//! so untouched entries keep their order.

use crate::entities::address::ParishSelection;
use crate::entities::registration::{
    AttachmentField, BankAccount, BankField, BusinessField, Contact, ContactField, Primary,
    RegistrationForm, StaffField, StaffMember,
};
use crate::schema::rules::normalize_phone;

/// A partial update to the registration form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch {
    Business(BusinessField, String),
    PhysicalAddress(String),
    Parish(ParishSelection),
    Attachment(AttachmentField, String),

    AddBankAccount,
    RemoveBankAccount(usize),
    BankAccount { index: usize, field: BankField, value: String },
    BankPrimary { index: usize, primary: bool },

    AddContact,
    RemoveContact(usize),
    Contact { index: usize, field: ContactField, value: String },
    ContactPrimary { index: usize, primary: bool },

    AddStaff,
    RemoveStaff(usize),
    Staff { index: usize, field: StaffField, value: String },
}

impl Patch {
    /// Field path this patch edits, for touched-state tracking
    pub fn path(&self) -> Option<String> {
        match self {
            Patch::Business(field, _) => Some(field.key().to_string()),
            Patch::PhysicalAddress(_) => Some("physicalAddress".to_string()),
            Patch::Parish(_) => Some("parishName".to_string()),
            Patch::Attachment(field, _) => Some(field.key().to_string()),
            Patch::BankAccount { index, field, .. } => {
                Some(format!("bankAccounts.{}.{}", index, field.key()))
            }
            Patch::BankPrimary { .. } => Some("bankAccounts".to_string()),
            Patch::Contact { index, field, .. } => Some(format!("contacts.{}.{}", index, field.key())),
            Patch::ContactPrimary { .. } => Some("contacts".to_string()),
            Patch::Staff { index, field, .. } => Some(format!("staff.{}.{}", index, field.key())),
            Patch::AddBankAccount
            | Patch::RemoveBankAccount(_)
            | Patch::AddContact
            | Patch::RemoveContact(_)
            | Patch::AddStaff
            | Patch::RemoveStaff(_) => None,
        }
    }
}

/// Merge a patch into a copy of `form`
pub fn apply(form: &RegistrationForm, patch: &Patch) -> RegistrationForm {
    let mut next = form.clone();
    match patch {
        Patch::Business(field, value) => {
            let value = if field.is_phone() {
                normalize_phone(value)
            } else {
                value.clone()
            };
            next.business.set(*field, value);
        }
        Patch::PhysicalAddress(value) => next.address.physical_address = value.clone(),
        Patch::Parish(selection) => next.address.apply_parish(selection),
        Patch::Attachment(field, value) => next.attachments.set(*field, value.clone()),

        Patch::AddBankAccount => {
            next.bank_accounts = added(&form.bank_accounts, BankAccount::default());
        }
        Patch::RemoveBankAccount(index) => {
            next.bank_accounts = removed(&form.bank_accounts, *index);
        }
        Patch::BankAccount { index, field, value } => {
            next.bank_accounts = edited(&form.bank_accounts, *index, |a| a.set(*field, value.clone()));
        }
        Patch::BankPrimary { index, primary } => {
            next.bank_accounts = handle_primary_change(&form.bank_accounts, *index, *primary);
        }

        Patch::AddContact => {
            next.contacts = added(&form.contacts, Contact::default());
        }
        Patch::RemoveContact(index) => {
            next.contacts = removed(&form.contacts, *index);
        }
        Patch::Contact { index, field, value } => {
            let value = if field.is_phone() {
                normalize_phone(value)
            } else {
                value.clone()
            };
            next.contacts = edited(&form.contacts, *index, |c| c.set(*field, value.clone()));
        }
        Patch::ContactPrimary { index, primary } => {
            next.contacts = handle_primary_change(&form.contacts, *index, *primary);
        }

        Patch::AddStaff => {
            let mut staff = form.staff.clone();
            staff.push(StaffMember::default());
            next.staff = staff;
        }
        Patch::RemoveStaff(index) => {
            let mut staff = form.staff.clone();
            if *index < staff.len() {
                staff.remove(*index);
            }
            next.staff = staff;
        }
        Patch::Staff { index, field, value } => {
            let value = if field.is_phone() {
                normalize_phone(value)
            } else {
                value.clone()
            };
            next.staff = edited(&form.staff, *index, |m| m.set(*field, value.clone()));
        }
    }
    next
}

/// Copy of `form` with every phone field normalized, for forms that did not
/// arrive through [`apply`] (drafts, pasted files)
pub fn normalize_phones(form: &RegistrationForm) -> RegistrationForm {
    let mut next = form.clone();
    next.business.contact_phone = normalize_phone(&form.business.contact_phone);
    for contact in &mut next.contacts {
        contact.phone = normalize_phone(&contact.phone);
    }
    for member in &mut next.staff {
        member.phone = normalize_phone(&member.phone);
    }
    next
}

/// Set or clear the primary flag at `index`. Setting it clears every other
/// entry, so at most one entry is primary afterwards.
pub fn handle_primary_change<T: Primary + Clone>(items: &[T], index: usize, primary: bool) -> Vec<T> {
    let mut updated = items.to_vec();
    if index >= updated.len() {
        return updated;
    }
    if primary {
        for (i, item) in updated.iter_mut().enumerate() {
            item.set_primary(i == index);
        }
    } else {
        updated[index].set_primary(false);
    }
    updated
}

fn edited<T: Clone>(items: &[T], index: usize, edit: impl FnOnce(&mut T)) -> Vec<T> {
    let mut updated = items.to_vec();
    if let Some(item) = updated.get_mut(index) {
        edit(item);
    }
    updated
}

/// Append an entry; the first entry of an empty list becomes primary
fn added<T: Primary + Clone>(items: &[T], mut entry: T) -> Vec<T> {
    let mut updated = items.to_vec();
    entry.set_primary(updated.is_empty());
    updated.push(entry);
    updated
}

/// Remove an entry; if it was primary, the first remaining entry takes over
fn removed<T: Primary + Clone>(items: &[T], index: usize) -> Vec<T> {
    let mut updated = items.to_vec();
    if index >= updated.len() {
        return updated;
    }
    let was_primary = updated.remove(index).is_primary();
    if was_primary {
        if let Some(first) = updated.first_mut() {
            first.set_primary(true);
        }
    }
    updated
}
