pub mod exam_submissions;

pub mod exams;

pub mod notifications;

pub mod websocket;

pub use exam_submissions::configure_exam_submissions_routes;
pub use exams::configure_exams_routes;
pub use notifications::configure_notifications_routes;
pub use websocket::configure_websocket_routes;
