use serde::{Deserialize, Serialize};

use roost_core::{BranchId, CustomerId, DomainError, DomainResult, Entity};

/// Delivery channel for customer-facing notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Line,
    Email,
    Sms,
}

/// Contact information for a customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Customer read entity.
///
/// Owned (created/updated) by the CRUD subsystem; this core only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    id: CustomerId,
    branch_id: BranchId,
    name: String,
    company_name: Option<String>,
    contact: ContactInfo,
    /// LINE user id bound to this customer, if they linked the bot.
    line_user_id: Option<String>,
}

impl Customer {
    pub fn new(
        id: CustomerId,
        branch_id: BranchId,
        name: impl Into<String>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("customer name cannot be empty"));
        }
        Ok(Self {
            id,
            branch_id,
            name,
            company_name: None,
            contact: ContactInfo::default(),
            line_user_id: None,
        })
    }

    pub fn with_company_name(mut self, company_name: impl Into<String>) -> Self {
        self.company_name = Some(company_name.into());
        self
    }

    pub fn with_contact(mut self, contact: ContactInfo) -> Self {
        self.contact = contact;
        self
    }

    pub fn with_line_user_id(mut self, line_user_id: impl Into<String>) -> Self {
        self.line_user_id = Some(line_user_id.into());
        self
    }

    pub fn id_typed(&self) -> CustomerId {
        self.id
    }

    pub fn branch_id(&self) -> BranchId {
        self.branch_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn company_name(&self) -> Option<&str> {
        self.company_name.as_deref()
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    /// Resolve the address this customer can be reached at over `channel`.
    ///
    /// Returns `None` when the customer has no identity for that channel;
    /// reminder scheduling skips such customers rather than erroring.
    pub fn channel_identity(&self, channel: Channel) -> Option<&str> {
        match channel {
            Channel::Line => self.line_user_id.as_deref(),
            Channel::Email => self.contact.email.as_deref(),
            Channel::Sms => self.contact.phone.as_deref(),
        }
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
