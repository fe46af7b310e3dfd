use std::fmt::{Debug, Write};

use ktkb_core::keymap::{KeyPos, Keymap};

/// Renders a layer as a grid of key labels, one line per row.
pub fn render_layer<C, const LAYERS: usize, const ROWS: usize, const COLS: usize>(
    keymap: &Keymap<C, LAYERS, ROWS, COLS>,
    layer: u8,
) -> Option<String>
where
    C: Copy + Debug,
{
    let name = keymap.layer_name(layer)?;
    let labels = (0..ROWS)
        .map(|row| {
            (0..COLS)
                .map(|col| {
                    keymap
                        .action(layer, KeyPos::new(row as u8, col as u8))
                        .map(|a| a.to_string())
                        .unwrap_or_default()
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let widths = (0..COLS)
        .map(|col| labels.iter().map(|row| row[col].len()).max().unwrap_or(0))
        .collect::<Vec<_>>();

    let mut out = String::new();
    let _ = writeln!(out, "[{layer}] {name}");
    for row in labels {
        let cells = row
            .iter()
            .zip(widths.iter())
            .map(|(label, width)| format!("{label:>width$}"))
            .collect::<Vec<_>>();
        let _ = writeln!(out, "  {}", cells.join(" | "));
    }

    Some(out)
}

/// Finds a layer by name, or by index when `layer` is a number.
pub fn find_layer<C, const LAYERS: usize, const ROWS: usize, const COLS: usize>(
    keymap: &Keymap<C, LAYERS, ROWS, COLS>,
    layer: &str,
) -> Option<u8> {
    keymap
        .layer_index(layer)
        .or_else(|| layer.parse::<u8>().ok().filter(|l| (*l as usize) < LAYERS))
}
