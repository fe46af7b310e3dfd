mod show;
mod simulate;
mod steps;

use std::{fmt::Debug, process::ExitCode};

use clap::{Parser, Subcommand, ValueEnum};
use ktkb_common::{__log::LevelFilter, dev_info, time::Clock};
use ktkb_core::{
    keyboard::{Keyboard, KeymapHooks},
    keymap::Keymap,
    sim::SimBoard,
};
use log::error;

use crate::{
    show::{find_layer, render_layer},
    simulate::{ManualClock, simulate, summary},
    steps::Step,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum BoardName {
    ErgodoxEz,
    Preonic,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prints the layers of a keymap.
    Show {
        board: BoardName,
        /// Only print this layer, by name or index.
        #[arg(long)]
        layer: Option<String>,
    },
    /// Feeds key events to a keymap and prints what the host receives.
    Simulate {
        board: BoardName,
        /// `p<row>,<col>` presses, `r<row>,<col>` releases, `t<row>,<col>`
        /// taps and `w<millis>` waits.
        #[arg(required = true)]
        steps: Vec<Step>,
    },
}

#[derive(Parser, Debug)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

fn show<C: Copy + Debug, const LAYERS: usize, const ROWS: usize, const COLS: usize>(
    keymap: &Keymap<C, LAYERS, ROWS, COLS>,
    layer: Option<&str>,
) -> Result<(), String> {
    let layers = match layer {
        Some(layer) => vec![find_layer(keymap, layer).ok_or_else(|| format!("Unknown layer: {layer}"))?],
        None => (0..LAYERS as u8).collect(),
    };

    for layer in layers {
        if let Some(grid) = render_layer(keymap, layer) {
            println!("{grid}");
        }
    }
    Ok(())
}

fn run_simulation<C, U, const LAYERS: usize, const ROWS: usize, const COLS: usize>(
    mut kb: Keyboard<'static, C, U, SimBoard, LAYERS, ROWS, COLS>,
    clock: &mut ManualClock,
    steps: &[Step],
) where
    C: Copy + Debug,
    U: KeymapHooks<C>,
{
    kb.init();
    kb.board_mut().take_reports();
    dev_info!("Running {} steps", steps.len());

    for line in simulate(&mut kb, clock, steps) {
        println!("{line}");
    }
    for line in summary(&kb) {
        println!("{line}");
    }
}

fn run(args: Args) -> Result<(), String> {
    match args.command {
        Command::Show { board: BoardName::ErgodoxEz, layer } => {
            show(&ktkb_ergodox_ez::layout::KEYMAP, layer.as_deref())
        }
        Command::Show { board: BoardName::Preonic, layer } => show(&ktkb_preonic::layout::KEYMAP, layer.as_deref()),
        Command::Simulate { board, steps } => {
            let mut clock = ManualClock::default();
            match board {
                BoardName::ErgodoxEz => {
                    run_simulation(ktkb_ergodox_ez::keyboard(SimBoard::new(), clock.now()), &mut clock, &steps)
                }
                BoardName::Preonic => {
                    run_simulation(ktkb_preonic::keyboard(SimBoard::new(), clock.now()), &mut clock, &steps)
                }
            }
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    env_logger::builder().filter_level(LevelFilter::Info).parse_default_env().init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
