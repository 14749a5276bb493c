//! Main Program for Tile Unscramble
//! Run with `--help` for more instruction

// Copyright (C) 2023 Dheatly23
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

mod batch;

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Error};
use clap::{Args, Parser, Subcommand};
use image::io::Reader as ImageReader;
use image::{save_buffer, ColorType, DynamicImage};
use sha2::{Digest, Sha256};
use tile_unscramble::seed::Locator;
use tile_unscramble::{
    derive_seed, descramble_tile, host_transform, scramble_tile, RasterImage, Seed,
    DEFAULT_SLICE_SIZE,
};

#[derive(Parser, Debug)]
#[command(author, version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rebuild one scrambled image
    Descramble(SingleArgs),

    /// Scramble one image the way the content host does
    Scramble(SingleArgs),

    /// Print the seed derived from a locator
    Seed {
        /// Image locator (must carry an `expires` parameter)
        locator: String,
    },

    /// Rebuild every image listed in page metadata
    Batch(batch::BatchArgs),
}

#[derive(Args, Debug)]
struct SingleArgs {
    /// Input file
    input: PathBuf,

    #[command(flatten)]
    key: KeyArgs,

    /// Tile size
    #[arg(short = 's', long, default_value_t = DEFAULT_SLICE_SIZE)]
    slice_size: usize,

    /// Output file
    #[arg(short = 'o', long)]
    output: PathBuf,
}

#[derive(Args, Debug)]
#[group(multiple = false)]
struct KeyArgs {
    /// Image locator to derive the seed from
    #[arg(long)]
    locator: Option<String>,

    /// Seed string, used as-is
    #[arg(long)]
    seed: Option<String>,
}

impl KeyArgs {
    fn resolve(&self) -> Result<Option<Seed>, Error> {
        Ok(match (&self.locator, &self.seed) {
            (Some(locator), _) => Some(derive_seed(locator, host_transform())?),
            (None, Some(seed)) => Some(Seed::from(seed.as_str())),
            (None, None) => None,
        })
    }
}

pub(crate) fn open_image(path: &Path) -> Result<DynamicImage, Error> {
    let im = ImageReader::new(BufReader::new(
        File::open(path).with_context(|| format!("opening {}", path.display()))?,
    ))
    .with_guessed_format()?
    .decode()
    .with_context(|| format!("decoding {}", path.display()))?;

    Ok(im)
}

pub(crate) fn save_raster(raster: RasterImage, path: &Path) -> Result<(), Error> {
    let is_jpeg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"));

    if is_jpeg && !matches!(raster.color(), ColorType::L8 | ColorType::Rgb8) {
        let Some(im) = raster.into_dynamic() else {
            bail!("cannot convert colour type for {}", path.display());
        };
        DynamicImage::ImageRgb8(im.into_rgb8()).save(path)?;
        return Ok(());
    }

    save_buffer(
        path,
        raster.as_bytes().context("raster is not in standard layout")?,
        raster.width(),
        raster.height(),
        raster.color(),
    )
    .with_context(|| format!("writing {}", path.display()))?;

    Ok(())
}

/// 32 hex digit checksum of `data`, the same kind of token the host puts in
/// locators.
fn content_seed(data: &[u8]) -> Seed {
    let digest = Sha256::digest(data);
    Seed::new(format!("{digest:x}")[..32].to_owned())
}

fn single(args: SingleArgs, forward: bool) -> Result<(), Error> {
    let seed = match args.key.resolve()? {
        Some(seed) => seed,
        None if forward => {
            let seed = content_seed(&fs::read(&args.input)?);
            log::info!("no seed given, using content checksum {seed}");
            seed
        }
        None => bail!("either --locator or --seed is required"),
    };

    let raster = RasterImage::from_dynamic(open_image(&args.input)?)?;
    log::debug!(
        "{}: {}x{} {:?}",
        args.input.display(),
        raster.width(),
        raster.height(),
        raster.color(),
    );

    let out = if forward {
        scramble_tile(raster, args.slice_size, &seed)?
    } else {
        descramble_tile(raster, args.slice_size, &seed)?
    };

    save_raster(out, &args.output)
}

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Descramble(args) => single(args, false),
        Command::Scramble(args) => single(args, true),
        Command::Seed { locator } => {
            let parsed = Locator::parse(&locator)?;
            println!("checksum: {}", parsed.checksum());
            println!("rotation: {}", parsed.rotation());
            println!("seed:     {}", derive_seed(&locator, host_transform())?);
            Ok(())
        }
        Command::Batch(args) => batch::run(args),
    }
}
