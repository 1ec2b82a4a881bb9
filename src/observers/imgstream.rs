use plotters::prelude::*;
use std::{error::Error, fs, path::Path, sync::mpsc};
use tracing::debug;

use crate::{ScalarField, preprocessing::RenderedField, sim::scenario::Snapshot};

/// Colour drawn over solid cells
pub const SOLID_COLOR: (u8, u8, u8) = (255, 255, 255);

#[derive(Clone)]
pub struct DisplayPacket {
    pub snapshot: Snapshot,
    pub i: usize,
}

/// Map `val` in `[min, max]` onto a four-band blue, cyan, green, yellow,
/// red scale. A degenerate range maps everything to the middle colour.
pub fn scientific_color(val: f32, min: f32, max: f32) -> (u8, u8, u8) {
    let val = val.max(min).min(max - 0.0001);

    let d = max - min;
    let val = if d == 0. { 0.5 } else { (val - min) / d };

    let m = 0.25;
    let num = (val / m).floor().clamp(0., 3.);
    let s = ((val - num * m) / m).clamp(0., 1.);

    let (r, g, b) = match num as u8 {
        0 => (0., s, 1.),
        1 => (0., 1., 1. - s),
        2 => (s, 1., 0.),
        _ => (1., 1. - s, 0.),
    };

    (
        (255. * r).floor() as u8,
        (255. * g).floor() as u8,
        (255. * b).floor() as u8,
    )
}

/// Range of `values` over open cells; `(0, 0)` if nothing is open
pub fn open_range(values: &ScalarField, mask: &ScalarField) -> (f32, f32) {
    let mut range: Option<(f32, f32)> = None;

    for (val, open) in values.iter().zip(mask.iter()) {
        if *open == 0. || !val.is_finite() {
            continue;
        }
        range = Some(match range {
            Some((lo, hi)) => (lo.min(*val), hi.max(*val)),
            None => (*val, *val),
        });
    }

    range.unwrap_or((0., 0.))
}

/// Colour every cell of `values`, row-major, with solids painted white
pub fn colorize(values: &ScalarField, mask: &ScalarField) -> Vec<(u8, u8, u8)> {
    let (min, max) = open_range(values, mask);
    let (rows, cols) = values.shape();

    let mut colors = Vec::with_capacity(rows * cols);
    for i in 0..rows {
        for j in 0..cols {
            if *mask.index((i, j)) == 0. {
                colors.push(SOLID_COLOR);
            } else {
                colors.push(scientific_color(*values.index((i, j)), min, max));
            }
        }
    }

    colors
}

pub fn image_save(
    snapshot: &Snapshot,
    field: RenderedField,
    filename: &str,
    frames_dir: &Path,
) -> Result<(), Box<dyn Error>> {
    let (rows, cols) = snapshot.smoke.shape();

    let filename = frames_dir.join(filename);

    let root = BitMapBackend::new(&filename, (cols as u32, rows as u32)).into_drawing_area();
    root.fill(&WHITE)?;

    let values = snapshot.field(field);
    for (k, (r, g, b)) in colorize(values, &snapshot.obstacle_mask)
        .into_iter()
        .enumerate()
    {
        let (i, j) = (k / cols, k % cols);
        root.draw_pixel((j as i32, i as i32), &RGBColor(r, g, b))?;
    }
    root.present()?;

    Ok(())
}

/// Write every inbound frame to `frames_dir` until the sender hangs up
pub fn image_io_loop(
    inbound_frames: mpsc::Receiver<DisplayPacket>,
    field: RenderedField,
    frames_dir: &Path,
) -> Result<(), Box<dyn Error>> {
    if frames_dir.exists() {
        fs::remove_dir_all(frames_dir)?;
    }
    fs::create_dir_all(frames_dir)?;

    for inbound in inbound_frames {
        image_save(
            &inbound.snapshot,
            field,
            format!("{}.png", inbound.i).as_str(),
            frames_dir,
        )?;
    }

    debug!("Image stream closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use na::dmatrix;

    use super::*;

    #[test]
    fn test_color_bands() {
        assert_eq!(scientific_color(0., 0., 1.), (0, 0, 255));
        assert_eq!(scientific_color(0.25, 0., 1.), (0, 255, 255));
        assert_eq!(scientific_color(0.5, 0., 1.), (0, 255, 0));
        assert_eq!(scientific_color(0.75, 0., 1.), (255, 255, 0));

        // the top of the range stays in the red band
        let (r, g, b) = scientific_color(1., 0., 1.);
        assert_eq!((r, b), (255, 0));
        assert!(g < 5);

        // out-of-range values clamp
        assert_eq!(scientific_color(-3., 0., 1.), (0, 0, 255));
    }

    #[test]
    fn test_degenerate_range() {
        assert_eq!(scientific_color(1., 1., 1.), (0, 255, 0));
    }

    #[test]
    fn test_colorize_masks_solids() {
        let snapshot = Snapshot {
            smoke: dmatrix![0., 1.; 0.5, 100.],
            pressure: dmatrix![0., 0.; 0., 0.],
            obstacle_mask: dmatrix![1., 1.; 1., 0.],
        };

        assert_eq!(open_range(&snapshot.smoke, &snapshot.obstacle_mask), (0., 1.));

        let colors = colorize(snapshot.field(RenderedField::Smoke), &snapshot.obstacle_mask);
        assert_eq!(colors.len(), 4);
        assert_eq!(colors[0], (0, 0, 255));
        assert_eq!(colors[2], (0, 255, 0));
        assert_eq!(colors[3], SOLID_COLOR);
    }
}
