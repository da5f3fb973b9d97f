//! Device Information Example
//!
//! Prints every supported device together with its derived geometry.
//!
//! Run with: cargo run --example device_info

use slm_specs::{DeviceId, DeviceSpec, PhysicalParams};

fn print_device_info(id: DeviceId, spec: &DeviceSpec) {
    println!("\n{}", "=".repeat(60));
    println!("Device: {} ({})", spec.name, id);
    println!("{}", "=".repeat(60));

    let (h, w) = spec.extent_m();
    let (ch, cw) = spec.center_m();
    println!("  Cells: {}×{}", spec.slm_shape.rows, spec.slm_shape.cols);
    println!(
        "  Cell pitch: {:.1}µm × {:.1}µm",
        spec.cell_dim.height_m * 1e6,
        spec.cell_dim.width_m * 1e6
    );
    println!("  Active area: {:.2}mm × {:.2}mm", h * 1e3, w * 1e3);
    println!("  Diagonal: {:.2}mm", spec.diagonal_m() * 1e3);
    println!("  Center: ({:.3}mm, {:.3}mm)", ch * 1e3, cw * 1e3);
    println!("  Color mode: {} ({} planes)", spec.color_mode, spec.planes());
    println!("  Driver: {}", spec.driver);
}

fn main() {
    for id in DeviceId::ALL {
        print_device_info(id, id.spec());
    }

    let optics = PhysicalParams::DEFAULT;
    println!(
        "\nDefault optics: λ = {:.0}nm, z = {:.2}m",
        optics.wavelength_m * 1e9,
        optics.propagation_distance_m
    );
}
