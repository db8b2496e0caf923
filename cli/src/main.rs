//! Iscaxr CLI
//!
//! Command-line front end for the spectral analysis library. Each subcommand
//! builds a synthetic field, runs one analysis on it and prints a summary.

use std::process;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use iscaxr_lib::{
    dispersion::{TIME_DIM, LON_DIM},
    equatorial::LAT_DIM,
    fft, find_peak,
    synthetic::{equatorial_signal, travelling_wave},
    window::{coherent_gain, power_gain, taper_weights},
    window_taper, zonal_dispersion, AxisSelection, DispersionConfig, EquatorialConfig,
    GriddedField, Result, SignConvention, DEFAULT_TAPER_WIDTH,
};

/// Arguments describing the synthetic travelling wave
fn wave_args() -> Vec<Arg> {
    vec![
        Arg::new("nt")
            .long("nt")
            .help("Number of time samples")
            .value_name("N")
            .value_parser(value_parser!(usize))
            .default_value("128"),
        Arg::new("nlon")
            .long("nlon")
            .help("Number of longitudes over [0, 360)")
            .value_name("N")
            .value_parser(value_parser!(usize))
            .default_value("64"),
        Arg::new("dt")
            .long("dt")
            .help("Time step between samples")
            .value_name("DT")
            .value_parser(value_parser!(f64))
            .default_value("1.0"),
        Arg::new("wavenumber")
            .long("wavenumber")
            .short('k')
            .help("Zonal wavenumber of the wave (negative for westward)")
            .value_name("K")
            .allow_negative_numbers(true)
            .value_parser(value_parser!(f64))
            .default_value("3"),
        Arg::new("frequency")
            .long("frequency")
            .short('f')
            .help("Frequency of the wave, cycles per unit time")
            .value_name("F")
            .value_parser(value_parser!(f64))
            .default_value("0.125"),
    ]
}

fn build_cli() -> Command {
    Command::new("Iscaxr")
        .version(iscaxr_lib::VERSION)
        .about("Spectral analysis of gridded GCM output")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("dispersion")
                .about("Zonal wavenumber-frequency power spectrum of a travelling wave")
                .args(wave_args())
                .arg(
                    Arg::new("taper")
                        .long("taper")
                        .help("Taper the first and last N time samples before transforming")
                        .value_name("N")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("transform-sign")
                        .long("transform-sign")
                        .help("Keep the raw transform basis instead of eastward-positive wavenumbers")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("equatorial")
                .about("Equatorial symmetric or antisymmetric zonal wave spectrum")
                .arg(
                    Arg::new("wavenumber")
                        .long("wavenumber")
                        .short('k')
                        .help("Zonal wavenumber of the signal")
                        .value_name("K")
                        .value_parser(value_parser!(f64))
                        .default_value("5"),
                )
                .arg(
                    Arg::new("power")
                        .long("power")
                        .short('p')
                        .help("Latitude structure sin(lat)^P; odd P is antisymmetric")
                        .value_name("P")
                        .value_parser(value_parser!(i32))
                        .default_value("1"),
                )
                .arg(
                    Arg::new("cutoff")
                        .long("cutoff")
                        .help("Half-width of the equatorial band in degrees")
                        .value_name("DEG")
                        .value_parser(value_parser!(f64))
                        .default_value("8"),
                )
                .arg(
                    Arg::new("antisymmetric")
                        .long("antisymmetric")
                        .short('a')
                        .help("Analyse the antisymmetric component")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("fft")
                .about("Fourier transform of a travelling wave over selected axes")
                .args(wave_args())
                .arg(
                    Arg::new("dim")
                        .long("dim")
                        .help("Axis name to transform (repeatable)")
                        .value_name("NAME")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("axis")
                        .long("axis")
                        .help("Axis position to transform, negative from the end (repeatable)")
                        .value_name("POS")
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(isize))
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("scale")
                        .long("scale")
                        .help("Axis name whose output coordinates use its own spacing (repeatable)")
                        .value_name("NAME")
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(
            Command::new("taper")
                .about("Print cosine-squared taper weights")
                .arg(
                    Arg::new("len")
                        .help("Length of the axis")
                        .value_name("LEN")
                        .value_parser(value_parser!(usize))
                        .index(1)
                        .default_value("100"),
                )
                .arg(
                    Arg::new("width")
                        .long("width")
                        .short('n')
                        .help("Number of tapered samples at each end")
                        .value_name("N")
                        .value_parser(value_parser!(usize)),
                ),
        )
}

fn wave_from(matches: &ArgMatches) -> Result<(GriddedField<f64>, f64)> {
    let nt = *matches.get_one::<usize>("nt").unwrap_or(&128);
    let nlon = *matches.get_one::<usize>("nlon").unwrap_or(&64);
    let dt = *matches.get_one::<f64>("dt").unwrap_or(&1.0);
    let k = *matches.get_one::<f64>("wavenumber").unwrap_or(&3.0);
    let f = *matches.get_one::<f64>("frequency").unwrap_or(&0.125);

    println!(
        "Travelling wave: k={}, f={}, {} times (dt={}), {} longitudes",
        k, f, nt, dt, nlon
    );
    Ok((travelling_wave(nt, dt, nlon, k, f)?, dt))
}

fn run_dispersion(matches: &ArgMatches) -> Result<()> {
    let (mut field, dt) = wave_from(matches)?;

    if let Some(&width) = matches.get_one::<usize>("taper") {
        field = window_taper(&field, TIME_DIM, width)?;
        println!("Tapered {} samples at each end of '{}'", width, TIME_DIM);
    }

    let convention = if matches.get_flag("transform-sign") {
        SignConvention::Transform
    } else {
        SignConvention::EastwardPositive
    };
    let config = DispersionConfig::new(dt)?.with_convention(convention);

    let power = zonal_dispersion(&field, &config)?;
    log::info!("Dispersion spectrum {:?} {:?}", power.dims(), power.shape());

    println!("Wavenumber convention: {}", convention);
    println!("Spectrum axes:");
    for axis in power.axes() {
        println!("  {}", axis);
    }
    println!("{}", find_peak(&power)?);
    Ok(())
}

fn run_equatorial(matches: &ArgMatches) -> Result<()> {
    let k = *matches.get_one::<f64>("wavenumber").unwrap_or(&5.0);
    let p = *matches.get_one::<i32>("power").unwrap_or(&1);
    let cutoff = *matches
        .get_one::<f64>("cutoff")
        .unwrap_or(&iscaxr_lib::equatorial::DEFAULT_LAT_CUTOFF);
    let symmetric = !matches.get_flag("antisymmetric");

    let config = EquatorialConfig::new(cutoff, symmetric)?;
    let signal = equatorial_signal(k, p)?;
    println!(
        "Signal cos({}·lon)·sin(lat)^{} on {:?} {:?}",
        k,
        p,
        signal.dims(),
        signal.shape()
    );

    let spectrum = iscaxr_lib::equatorial_waves(&signal, &config)?;
    log::info!(
        "Equatorial spectrum {:?} {:?}",
        spectrum.dims(),
        spectrum.shape()
    );

    println!(
        "{} component within {} degrees of the equator (latitudes from '{}'):",
        if symmetric { "Symmetric" } else { "Antisymmetric" },
        cutoff,
        LAT_DIM
    );
    let wavenumbers = spectrum.coords("F_lon")?;
    for (j, &wn) in wavenumbers.iter().enumerate() {
        if let Some(&value) = spectrum.get(&[j]) {
            if value > 1e-10 {
                println!("  k={:+}: {:.6}", wn, value);
            }
        }
    }
    println!("Largest magnitude: {:.6}", spectrum.max_abs());
    Ok(())
}

fn run_fft(matches: &ArgMatches) -> Result<()> {
    let dims = matches
        .get_many::<String>("dim")
        .map(|values| values.cloned().collect::<Vec<_>>());
    let axes = matches
        .get_many::<isize>("axis")
        .map(|values| values.copied().collect::<Vec<_>>());
    let selection = AxisSelection::from_options(dims, axes)?;

    let scale: Vec<&str> = matches
        .get_many::<String>("scale")
        .map(|values| values.map(String::as_str).collect())
        .unwrap_or_default();

    let (field, _) = wave_from(matches)?;
    let spectrum = fft(&field, &selection, &scale)?;
    let magnitude = spectrum.norm();
    log::info!("Transformed {:?} -> {:?}", field.dims(), magnitude.dims());

    println!("Output axes:");
    for axis in magnitude.axes() {
        println!("  {}", axis);
    }

    let (mut best, mut peak) = (None, f64::NEG_INFINITY);
    for (index, &value) in magnitude.data().indexed_iter() {
        if value > peak {
            peak = value;
            best = Some(index);
        }
    }
    if let Some(index) = best {
        let location: Vec<String> = magnitude
            .axes()
            .iter()
            .enumerate()
            .map(|(i, axis)| format!("{}={}", axis.name, axis.coords[index[i]]))
            .collect();
        println!("Largest magnitude {:.4} at {}", peak, location.join(", "));
    }
    if magnitude.has_axis(LON_DIM) {
        println!("'{}' was not transformed", LON_DIM);
    }
    Ok(())
}

fn run_taper(matches: &ArgMatches) -> Result<()> {
    let len = *matches.get_one::<usize>("len").unwrap_or(&100);
    let width = matches
        .get_one::<usize>("width")
        .copied()
        .unwrap_or(DEFAULT_TAPER_WIDTH);

    let weights = taper_weights(len, width)?;
    println!("Cosine-squared taper, {} of {} samples at each end:", width, len);
    for (i, w) in weights.iter().enumerate() {
        println!("  {:4}: {:.6}", i, w);
    }
    println!("Coherent gain: {:.6}", coherent_gain(&weights));
    println!("Power gain:    {:.6}", power_gain(&weights));
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = build_cli().get_matches();

    let result = match matches.subcommand() {
        Some(("dispersion", sub)) => run_dispersion(sub),
        Some(("equatorial", sub)) => run_equatorial(sub),
        Some(("fft", sub)) => run_fft(sub),
        Some(("taper", sub)) => run_taper(sub),
        _ => Ok(()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_dim_and_axis_conflict() {
        let matches = build_cli()
            .try_get_matches_from(["iscaxr", "fft", "--dim", "lon", "--axis", "-1"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        let err = run_fft(sub).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_dispersion_subcommand() {
        let matches = build_cli()
            .try_get_matches_from(["iscaxr", "dispersion", "--nt", "32", "--nlon", "16"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "dispersion");
        assert!(run_dispersion(sub).is_ok());
    }

    #[test]
    fn test_taper_overlap_rejected() {
        let matches = build_cli()
            .try_get_matches_from(["iscaxr", "taper", "10", "--width", "6"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert!(run_taper(sub).unwrap_err().is_invalid_input());
    }
}
