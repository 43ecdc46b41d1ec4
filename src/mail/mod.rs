//! Mail dispatch: profile resolution, recipient partitioning, SMTP delivery.

pub mod profile;
pub mod recipients;
pub mod transport;

pub use profile::{ClientId, ProfileOverrides, SenderCredentials, TransportProfile, resolve_profile};
pub use recipients::{RecipientSet, partition_recipients};
pub use transport::{MailTransport, OutboundMail, SmtpMailer};
