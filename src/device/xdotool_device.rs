use log::*;
use tokio::process::Command;

use crate::device::{Device, DeviceError};

const XDOTOOL: &str = "xdotool";

/// Injects input on X11 by shelling out to `xdotool`.
#[derive(Debug, Clone)]
pub struct XdotoolDevice {
    program: String,
}

impl XdotoolDevice {
    pub fn new() -> XdotoolDevice {
        XdotoolDevice {
            program: XDOTOOL.to_string(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<(), DeviceError> {
        trace!("{} {}", self.program, args.join(" "));
        let status = Command::new(&self.program).args(args).status().await?;
        if status.success() {
            Ok(())
        } else {
            Err(DeviceError::Failed(status))
        }
    }
}

impl Default for XdotoolDevice {
    fn default() -> Self {
        XdotoolDevice::new()
    }
}

// X keysyms are case sensitive, the names used by commands are not
fn keysym(key: &str) -> &str {
    match key {
        "shift" => "Shift_L",
        "control" => "Control_L",
        "alt" => "Alt_L",
        "backspace" => "BackSpace",
        "tab" => "Tab",
        other => other,
    }
}

impl Device for XdotoolDevice {
    async fn activate(&self, pid: u32) -> Result<(), DeviceError> {
        let pid = pid.to_string();
        self.run(&["search", "--pid", &pid, "windowactivate", "--sync"])
            .await
    }

    async fn click(&self) -> Result<(), DeviceError> {
        self.run(&["click", "1"]).await
    }

    async fn move_mouse_to(&self, x: i32, y: i32) -> Result<(), DeviceError> {
        let x = x.to_string();
        let y = y.to_string();
        self.run(&["mousemove", "--sync", &x, &y]).await
    }

    async fn press_key(&self, key: &str) -> Result<(), DeviceError> {
        self.run(&["key", keysym(key)]).await
    }

    async fn toggle_key(&self, key: &str, pressed: bool) -> Result<(), DeviceError> {
        let direction = if pressed { "keydown" } else { "keyup" };
        self.run(&[direction, keysym(key)]).await
    }
}
