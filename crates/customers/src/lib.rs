//! Customer domain module.
//!
//! The customer record is owned by the surrounding CRUD application; this
//! crate models the read view the reminder/billing core needs, in particular
//! the messaging-channel identities used for reminder delivery.

pub mod customer;

pub use customer::{Channel, ContactInfo, Customer};
