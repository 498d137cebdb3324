pub mod agent;
pub mod folder;
pub mod scan;

pub use agent::{Agent, AgentGroup};
pub use folder::Folder;
pub use scan::{ExportFormat, ExportStatus, ScanList, ScanSummary, Template, TemplateKind, Timezone};
