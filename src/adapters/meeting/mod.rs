//! Meeting adapters.
//!
//! - `graph_meeting` - Microsoft Graph communications API
//! - `meeting_url` - Join link validation and identifier extraction
//! - `mock_meeting` - In-memory gateway for tests

mod graph_meeting;
pub mod meeting_url;
mod mock_meeting;

pub use graph_meeting::{GraphMeetingConfig, GraphMeetingGateway, DEFAULT_GRAPH_BASE_URL};
pub use meeting_url::{
    extract_meeting_id, is_valid_meeting_url, validate_meeting_url, InvalidMeetingUrl, LinkKind,
    MeetingLinkInfo,
};
pub use mock_meeting::MockMeetingGateway;
