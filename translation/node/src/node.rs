use crate::config::NodeConfig;
use crate::context::{NodeContext, NodeStatus};
use crate::credentials::{CredentialProvider, CredentialStore};
use crate::error::NodeError;
use crate::message::FlowMessage;
use golem_speech_translation::{
    RelayConfig, RelayError, RelayResult, SpeechTranslationService, TurnHandle, TurnObserver,
    TurnRelay, TurnRequest, TurnStatus,
};
use log::debug;
use std::sync::Arc;

/// Flow node that translates spoken audio into synthesized speech in
/// another language.
///
/// Every inbound message starts an independent turn; the outbound message
/// is the inbound one with its payload replaced by the synthesized audio.
pub struct TranslateSpeechNode {
    config: NodeConfig,
    relay: TurnRelay,
    credentials: Box<dyn CredentialProvider>,
    context: Arc<dyn NodeContext>,
}

impl TranslateSpeechNode {
    pub fn new(
        config: NodeConfig,
        service: Arc<dyn SpeechTranslationService>,
        relay_config: RelayConfig,
        store: &Arc<CredentialStore>,
        context: Arc<dyn NodeContext>,
    ) -> Result<Self, NodeError> {
        config.validate()?;

        let relay_config = match &config.region {
            Some(region) => relay_config.with_region(region.clone()),
            None => relay_config,
        };
        let relay = TurnRelay::new(service, relay_config)?;
        let credentials = config.credentials.clone().into_provider(store)?;

        Ok(Self {
            config,
            relay,
            credentials,
            context,
        })
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Handles one inbound message. Returns the running turn, or `None` when
    /// the message was rejected; rejections have already been raised on the
    /// context.
    pub fn on_input(&self, msg: FlowMessage) -> Option<TurnHandle> {
        let key = self.credentials.subscription_key();

        if self.config.debug {
            debug!(
                "[{}] credentials={} present={}",
                self.config.label(),
                self.credentials.kind(),
                key.is_some()
            );
            debug!("[{}] from={}", self.config.label(), self.config.from);
            debug!("[{}] to={}", self.config.label(), self.config.to);
            debug!("[{}] voice={}", self.config.label(), self.config.voice);
        }

        let mut request = TurnRequest::new(
            msg.audio(),
            self.config.from.clone(),
            self.config.to.clone(),
            self.config.voice.clone(),
        )
        .with_request_id(msg.msg_id.clone());
        if let Some(key) = key {
            request = request.with_subscription_key(key);
        }

        let observer = Arc::new(MessageObserver {
            msg,
            context: Arc::clone(&self.context),
        });
        self.relay.handle_turn(request, observer).ok()
    }
}

/// Routes a turn's output back onto the message that started it.
struct MessageObserver {
    msg: FlowMessage,
    context: Arc<dyn NodeContext>,
}

impl TurnObserver for MessageObserver {
    fn on_status(&self, status: TurnStatus) {
        self.context.status(NodeStatus::from(&status));
    }

    fn on_result(&self, result: RelayResult) {
        self.context.send(self.msg.reply_with(result.audio));
    }

    fn on_error(&self, error: RelayError) {
        self.context.error(&error, &self.msg);
    }
}
