//! ESP-NOW point-to-point radio adapter.
//!
//! The sensor node sends one encoded [`MotionReport`] per sample tick
//! to the base station's MAC; the base station registers a receive
//! callback that forwards raw frames into
//! [`RX_FRAME_CHANNEL`](crate::app::channels::RX_FRAME_CHANNEL) for the
//! receiver worker. ESP-NOW needs Wi-Fi started in station mode first;
//! the bins handle that.

use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::espnow::{EspNow, PeerInfo};
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{ClientConfiguration, Configuration, EspWifi};
use log::{info, warn};

use crate::app::channels::{RX_FRAME_CHANNEL, RxFrame, post};
use crate::app::ports::RadioPort;
use crate::error::RadioError;
use crate::events::MotionReport;

/// Base-station MAC the sensor node is paired with.
pub const BASE_STATION_MAC: [u8; 6] = [0xCC, 0xDB, 0xA7, 0x01, 0xE6, 0x10];

/// Bring the Wi-Fi STA interface up (started, not associated) —
/// ESP-NOW rides on it. The returned handle must stay alive for the
/// life of the radio.
pub fn start_wifi() -> Result<EspWifi<'static>, RadioError> {
    let init = || -> Result<EspWifi<'static>, esp_idf_svc::sys::EspError> {
        let peripherals = Peripherals::take()?;
        let sysloop = EspSystemEventLoop::take()?;
        let nvs = EspDefaultNvsPartition::take()?;
        let mut wifi = EspWifi::new(peripherals.modem, sysloop, Some(nvs))?;
        wifi.set_configuration(&Configuration::Client(ClientConfiguration::default()))?;
        wifi.start()?;
        Ok(wifi)
    };
    init().map_err(|e| {
        warn!("wifi sta start failed: {e}");
        RadioError::InitFailed
    })
}

pub struct EspNowRadio {
    espnow: EspNow<'static>,
    peer: [u8; 6],
}

impl EspNowRadio {
    /// Take the ESP-NOW driver and pair with `peer`.
    pub fn new(peer: [u8; 6]) -> Result<Self, RadioError> {
        let espnow = EspNow::take().map_err(|e| {
            warn!("esp-now init failed: {e}");
            RadioError::InitFailed
        })?;
        espnow
            .add_peer(PeerInfo {
                peer_addr: peer,
                ..PeerInfo::default()
            })
            .map_err(|e| {
                warn!("esp-now add_peer failed: {e}");
                RadioError::InitFailed
            })?;
        info!("esp-now paired with {peer:02x?}");
        Ok(Self { espnow, peer })
    }

    /// Install the receive callback (base station only). Frames are
    /// copied into the bounded channel; oversized frames are dropped
    /// before they reach the decoder.
    pub fn start_receiver(&self) -> Result<(), RadioError> {
        self.espnow
            .register_recv_cb(|_mac, data| {
                let mut bytes = heapless::Vec::new();
                if bytes.extend_from_slice(data).is_ok() {
                    post(&RX_FRAME_CHANNEL, RxFrame { bytes }, "rx frame");
                } else {
                    warn!("dropping oversized {}-byte frame", data.len());
                }
            })
            .map_err(|_| RadioError::InitFailed)
    }
}

impl RadioPort for EspNowRadio {
    fn send(&mut self, report: &MotionReport) -> Result<(), RadioError> {
        let frame = report.encode().map_err(|_| RadioError::BadFrame)?;
        self.espnow
            .send(self.peer, &frame)
            .map_err(|_| RadioError::SendFailed)
    }
}
