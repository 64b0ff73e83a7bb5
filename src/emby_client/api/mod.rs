mod queries;
mod responses;
mod session;
mod types;

pub use queries::ActivityLogQuery;
pub use responses::{DashboardResults, SectionResult};
pub use session::{MediaStream, NowPlayingItem, PlayState, Session};
pub use types::{
    ActivityEntry, Device, EndpointInfo, ItemCounts, LibraryFolder, PublicSystemInfo,
    ScheduledTask, SystemInfo, TaskState, User,
};
