pub mod dry_run_device;
pub mod xdotool_device;

use std::future::Future;
use std::process::ExitStatus;
use thiserror::Error;

use crate::command::Action;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("unable to run input tool: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("input tool exited with {0}")]
    Failed(ExitStatus),
}

/// OS level input injection into the game window.
pub trait Device: Send + Sync {
    /// Brings the window owned by `pid` to the front.
    fn activate(&self, pid: u32) -> impl Future<Output = Result<(), DeviceError>> + Send;

    fn click(&self) -> impl Future<Output = Result<(), DeviceError>> + Send;

    /// `x` and `y` are desktop coordinates, window offset included.
    fn move_mouse_to(&self, x: i32, y: i32)
        -> impl Future<Output = Result<(), DeviceError>> + Send;

    fn press_key(&self, key: &str) -> impl Future<Output = Result<(), DeviceError>> + Send;

    fn toggle_key(
        &self,
        key: &str,
        pressed: bool,
    ) -> impl Future<Output = Result<(), DeviceError>> + Send;
}

pub async fn perform<D: Device>(device: &D, action: &Action) -> Result<(), DeviceError> {
    match action {
        Action::MoveTo { x, y } => device.move_mouse_to(*x, *y).await,
        Action::Click => device.click().await,
        Action::KeyTap { key } => device.press_key(key).await,
        Action::KeyHold { key, pressed } => device.toggle_key(key, *pressed).await,
        Action::Wait(duration) => {
            tokio::time::sleep(*duration).await;
            Ok(())
        }
    }
}
