//! Headless document model for the Vista page controller.
//!
//! Pages are parsed from HTML into an arena of [`Element`]s that can be
//! queried with CSS-style selectors and mutated the way page scripts mutate
//! a live DOM (class lists, inline styles, text, form properties). Every
//! effective mutation is appended to a [`Journal`] so a session can be
//! replayed and inspected afterwards.

pub mod document;
pub mod error;
pub mod html;
pub mod layout;
pub mod mutation;
pub mod selector;

pub use document::{Document, Element, NodeId};
pub use error::DomError;
pub use layout::{BlockLayout, Geometry, Layout};
pub use mutation::{Journal, JournalEntry, Mutation};
pub use selector::Selector;
