use log::*;

use crate::device::{Device, DeviceError};

/// Logs input instead of injecting it. Useful for rehearsing a stream
/// without the game in focus.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunDevice;

impl Device for DryRunDevice {
    async fn activate(&self, pid: u32) -> Result<(), DeviceError> {
        info!("[dry run] activate window of process {}", pid);
        Ok(())
    }

    async fn click(&self) -> Result<(), DeviceError> {
        info!("[dry run] click");
        Ok(())
    }

    async fn move_mouse_to(&self, x: i32, y: i32) -> Result<(), DeviceError> {
        info!("[dry run] move mouse to ({}, {})", x, y);
        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<(), DeviceError> {
        info!("[dry run] tap {}", key);
        Ok(())
    }

    async fn toggle_key(&self, key: &str, pressed: bool) -> Result<(), DeviceError> {
        info!("[dry run] {} {}", if pressed { "hold" } else { "release" }, key);
        Ok(())
    }
}
