use std::env;
use std::error::Error;
use std::path::{Path, PathBuf};

use clap::Args;
use nswalk_core::{cubic_cell, Configuration};
use nswalk_engine::{resolve_engine_path, LjParams, ENGINE_PATH_VAR};
use nswalk_walk::{ModelEngine, SamplerEngine};
use serde::Serialize;

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Native engine shared object to probe in addition to the built-in one.
    #[arg(long)]
    pub engine: Option<PathBuf>,
    /// Emit only JSON without the status line.
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: String,
    ok: bool,
    detail: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    status: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(args: &DoctorArgs) -> Result<(), Box<dyn Error>> {
    let report = diagnose(args)?;
    let rendered = serde_json::to_string_pretty(&report)?;
    if args.quiet {
        println!("{rendered}");
    } else {
        println!("nswalk-sim doctor status: {}", report.status);
        println!("{rendered}");
    }
    if report.status != "ok" {
        return Err("one or more checks failed".into());
    }
    Ok(())
}

fn diagnose(args: &DoctorArgs) -> Result<DoctorReport, Box<dyn Error>> {
    let mut checks = Vec::new();

    checks.push(match env::var(ENGINE_PATH_VAR) {
        Ok(root) => DoctorCheck {
            name: format!("{ENGINE_PATH_VAR} set"),
            ok: Path::new(&root).is_dir(),
            detail: root,
        },
        Err(_) => DoctorCheck {
            name: format!("{ENGINE_PATH_VAR} set"),
            ok: true,
            detail: "unset; relative engine paths resolve next to the executable".into(),
        },
    });

    checks.push(builtin_round_trip());

    if let Some(engine) = &args.engine {
        checks.push(match resolve_engine_path(engine) {
            Ok(path) => DoctorCheck {
                name: "engine shared object resolves".into(),
                ok: true,
                detail: path.display().to_string(),
            },
            Err(err) => DoctorCheck {
                name: "engine shared object resolves".into(),
                ok: false,
                detail: err.to_string(),
            },
        });
        checks.push(match SamplerEngine::from_shared_object(engine) {
            Ok(sampler) => DoctorCheck {
                name: "engine sampler symbols load".into(),
                ok: true,
                detail: format!("seed width {}", sampler.seed_width()),
            },
            Err(err) => DoctorCheck {
                name: "engine sampler symbols load".into(),
                ok: false,
                detail: err.to_string(),
            },
        });
    }

    let ok = checks.iter().all(|check| check.ok);
    Ok(DoctorReport {
        status: if ok { "ok" } else { "failed" }.into(),
        checks,
    })
}

fn builtin_round_trip() -> DoctorCheck {
    let name = "built-in engine evaluates".to_string();
    let result = (|| -> Result<f64, Box<dyn Error>> {
        let config = Configuration::new(
            vec![18, 18],
            vec![0.0, 0.0, 0.0, 1.5, 0.0, 0.0],
            cubic_cell(10.0),
            vec![1.0, 1.0],
        )?;
        let mut model = ModelEngine::builtin(LjParams::default())?;
        Ok(model.eval_energy(&config)?)
    })();
    match result {
        Ok(energy) if energy.is_finite() => DoctorCheck {
            name,
            ok: true,
            detail: format!("dimer energy {energy:.6}"),
        },
        Ok(energy) => DoctorCheck {
            name,
            ok: false,
            detail: format!("non-finite energy {energy}"),
        },
        Err(err) => DoctorCheck {
            name,
            ok: false,
            detail: err.to_string(),
        },
    }
}
