// ABOUTME: Calendar integration for Planea
// ABOUTME: Google Calendar notifier plus agenda synthesis from database rows

pub mod agenda;
pub mod google;

pub use agenda::{build_agenda, AgendaEvent, AgendaEventKind};
pub use google::GoogleCalendarNotifier;
