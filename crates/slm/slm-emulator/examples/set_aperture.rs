//! Set an aperture on a device and save what it shows
//!
//! Run with:
//!   cargo run --example set_aperture -- circ 2.0
//!   cargo run --example set_aperture -- rect 1.5 nokia_5110 rect.png
//!
//! Arguments: `<shape> <size_mm> [device] [preview.png]`. The size is the
//! side, length or radius; rectangles use it for the height and twice it for
//! the width. Use `RUST_LOG=debug` to follow the session.

use std::error::Error;

use slm_aperture::{Aperture, ApertureShape};
use slm_emulator::{NoHardware, PreviewConfig, SessionConfig, Slm};
use slm_specs::DeviceId;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let shape: ApertureShape = args.next().as_deref().unwrap_or("circ").parse()?;
    let size_m = args.next().map(|s| s.parse::<f64>()).transpose()?.unwrap_or(2.0) * 1e-3;
    let device: DeviceId = args
        .next()
        .as_deref()
        .unwrap_or(DeviceId::Adafruit1p8TftRgb.as_str())
        .parse()?;
    let output = args.next().unwrap_or_else(|| format!("{shape}_{device}.png"));

    // Small panels are only a few dozen cells tall; blow previews up further.
    let config = SessionConfig {
        preview: PreviewConfig {
            scale: 8,
            ..PreviewConfig::DEFAULT
        },
        ..SessionConfig::new(device)
    };
    let mut slm = Slm::open(config, &NoHardware)?;
    let spec = slm.spec();

    let aperture = match shape {
        ApertureShape::Rect => Aperture::rect((size_m, 2.0 * size_m)),
        ApertureShape::Square => Aperture::square(size_m),
        ApertureShape::Line => Aperture::line(size_m, false),
        ApertureShape::Circ => Aperture::circ(size_m),
    };
    let mask = aperture.mask(spec)?;
    println!(
        "{} on {}: {} of {} cells active",
        shape,
        spec.name,
        mask.count_active(),
        spec.n_cells()
    );

    slm.show_buffer(&mask)?;
    if let Some(preview) = slm.as_virtual() {
        preview.save_preview(&output)?;
        println!("Preview saved to {output}");
    }
    Ok(())
}
