use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use nswalk_core::Configuration;
use nswalk_engine::LjParams;
use nswalk_walk::{
    GmcWalkParams, McVeloWalkParams, McWalkParams, MdWalkParams, SamplerEngine, VeloWalkParams,
};
use serde::Deserialize;
use serde_json::json;

#[derive(Args, Debug)]
pub struct WalkArgs {
    /// YAML walk description (family, parameters, optional model block).
    #[arg(long)]
    pub config: PathBuf,
    /// JSON configuration snapshot to walk.
    #[arg(long = "in")]
    pub input: PathBuf,
    /// Where to write the endpoint configuration; omitted means stdout only.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Native engine shared object; the built-in engine runs otherwise.
    #[arg(long)]
    pub engine: Option<PathBuf>,
    /// Seed words, one per engine seed slot.
    #[arg(long, value_delimiter = ',')]
    pub seed: Vec<i32>,
}

#[derive(Debug, Deserialize)]
struct WalkFile {
    /// Model parameters for the built-in engine; native engines carry their
    /// own model state and ignore this block.
    #[serde(default)]
    model: LjParams,
    #[serde(flatten)]
    spec: WalkSpec,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "family", content = "params", rename_all = "snake_case")]
enum WalkSpec {
    McAtomWalkVelo(VeloWalkParams),
    McAtomWalk(McWalkParams),
    McAtomWalkWithVelocities(McVeloWalkParams),
    GmcAtomWalk(GmcWalkParams),
    MdAtomNveWalk(MdWalkParams),
}

pub fn run(args: &WalkArgs) -> Result<(), Box<dyn Error>> {
    let file: WalkFile = serde_yaml::from_str(&fs::read_to_string(&args.config)?)?;
    let mut config: Configuration = serde_json::from_str(&fs::read_to_string(&args.input)?)?;

    let mut sampler = match &args.engine {
        Some(path) => SamplerEngine::from_shared_object(path)?,
        None => SamplerEngine::builtin(file.model),
    };
    if !args.seed.is_empty() {
        sampler.set_seed(&args.seed)?;
    }

    let report = match &file.spec {
        WalkSpec::McAtomWalkVelo(params) => {
            let stats = sampler.mc_atom_walk_velo(&mut config, params)?;
            json!({ "family": "mc_atom_walk_velo", "stats": stats })
        }
        WalkSpec::McAtomWalk(params) => {
            let stats = sampler.mc_atom_walk(&mut config, params)?;
            json!({ "family": "mc_atom_walk", "stats": stats })
        }
        WalkSpec::McAtomWalkWithVelocities(params) => {
            let stats = sampler.mc_atom_walk_with_velocities(&mut config, params)?;
            json!({ "family": "mc_atom_walk_with_velocities", "stats": stats })
        }
        WalkSpec::GmcAtomWalk(params) => {
            let stats = sampler.gmc_atom_walk(&mut config, params)?;
            json!({ "family": "gmc_atom_walk", "stats": stats })
        }
        WalkSpec::MdAtomNveWalk(params) => {
            let final_e = sampler.md_atom_nve_walk(&mut config, params)?;
            json!({ "family": "md_atom_nve_walk", "final_e": final_e })
        }
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    if let Some(out) = &args.out {
        fs::write(out, serde_json::to_string_pretty(&config)?)?;
    }
    Ok(())
}
