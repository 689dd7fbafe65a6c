pub mod activity;
pub mod audit_event;
pub mod dashboard;
pub mod lead;
pub mod user;

pub use activity::{Activity, NewActivity};
pub use audit_event::AuditEvent;
pub use dashboard::DashboardSnapshot;
pub use lead::{Lead, LeadPage, LeadResponse, LeadUpdate, LeadWithOwner, NewLead};
pub use user::User;
