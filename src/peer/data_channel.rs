use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::MissedTickBehavior;
use webrtc::data_channel::data_channel_init::RTCDataChannelInit;
use webrtc::data_channel::data_channel_state::RTCDataChannelState;
use webrtc::data_channel::RTCDataChannel;

/// Options for the eagerly created outbound channel: ordered, reliable.
pub fn channel_options() -> RTCDataChannelInit {
    RTCDataChannelInit {
        ordered: Some(true),
        ..Default::default()
    }
}

/// Where the periodic counter goes. The indirection exists so the timer
/// logic is testable without an opened channel.
pub(crate) trait CounterOutlet: Send + Sync {
    fn is_open(&self) -> bool;
    fn send(&self, value: u64) -> impl Future<Output = bool> + Send;
}

impl CounterOutlet for Arc<RTCDataChannel> {
    fn is_open(&self) -> bool {
        self.ready_state() == RTCDataChannelState::Open
    }

    async fn send(&self, value: u64) -> bool {
        match self.send_text(value.to_string()).await {
            Ok(_) => true,
            Err(e) => {
                log::warn!("counter send failed: {}", e);
                false
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SendOutcome {
    Sent,
    NotOpen,
    Failed,
}

/// One load-send-increment step, serialized through `gate` so the manual
/// send command and the periodic task cannot both read the same value and
/// put a duplicate on the wire. The counter only advances after the send
/// succeeded.
pub(crate) async fn send_current<O: CounterOutlet>(
    outlet: &O,
    counter: &AtomicU64,
    gate: &AsyncMutex<()>,
) -> SendOutcome {
    let _guard = gate.lock().await;
    if !outlet.is_open() {
        return SendOutcome::NotOpen;
    }
    let value = counter.load(Ordering::SeqCst);
    if outlet.send(value).await {
        log::debug!("sent counter {}", value);
        counter.fetch_add(1, Ordering::SeqCst);
        SendOutcome::Sent
    } else {
        SendOutcome::Failed
    }
}

/// Sends the counter once per period while the outlet stays open. The state
/// is re-checked before every send; the first check happens on the first
/// tick, which fires immediately.
pub(crate) async fn run_counter_loop<O: CounterOutlet>(
    outlet: O,
    counter: Arc<AtomicU64>,
    gate: Arc<AsyncMutex<()>>,
    period: Duration,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        match send_current(&outlet, &counter, &gate).await {
            SendOutcome::Sent => {}
            SendOutcome::NotOpen => {
                log::info!("counter loop stopped: channel no longer open");
                break;
            }
            SendOutcome::Failed => break,
        }
    }
}
