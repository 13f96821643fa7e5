//! Everything that leaves the calculators: lead capture, WhatsApp links
//! and the market-rate feed.

pub mod form;
pub mod rates;
pub mod submission;
pub mod whatsapp;

pub use form::{DocumentAvailability, LeadForm, LeadFormError};
pub use rates::{RateFeed, RateFeedError, RateQuote, parse_rates};
pub use submission::{LeadError, LeadSink, LeadSubmission, MemoryLeadSink, calculator_form_type};
pub use whatsapp::WhatsAppMessage;
