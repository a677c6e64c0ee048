pub mod config;
pub mod context;
pub mod credentials;
pub mod error;
pub mod message;
pub mod node;

pub use config::NodeConfig;
pub use context::{NodeContext, NodeStatus, StatusFill, StatusShape};
pub use credentials::{
    CredentialProvider, CredentialSource, CredentialStore, EnvCredentials, InlineCredentials,
    SharedCredential, SharedCredentials,
};
pub use error::NodeError;
pub use message::FlowMessage;
pub use node::TranslateSpeechNode;
