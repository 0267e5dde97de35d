//! Commands exposed by the `adpublish` CLI

pub mod publish;

pub use publish::{
    get_publish_status, pause_campaign, publish_campaign, resume_campaign, resume_publish,
};
