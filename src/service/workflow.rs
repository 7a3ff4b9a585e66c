// SPDX-License-Identifier: MIT OR Apache-2.0

//! The resolution workflow.
//!
//! A run is a flat plan of stages. The default plan is
//!
//! ```text
//! hook(first)
//! load(overrides) hook(overrides)
//! load(argv) argv-file hook(argv)
//! load(env) hook(env)
//! load(files) hook(files)
//! load(defaults) hook(defaults)
//! required
//! ```
//!
//! A custom workflow replaces the whole plan. The blocking and the async
//! runner walk the same plan; only the async one can await deferred hooks.

use crate::domain::{HookPoint, Result, Step};
use crate::ports::ConfigStore;
use crate::service::loaders::{env_adapter, load_argv_file, loader_for, LoadContext};
use crate::service::settings::Settings;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Stage {
    Hook(HookPoint),
    Load(Step),
    ArgvFile,
    Required,
    Custom,
}

/// Snapshots captured by a successful run.
#[derive(Debug, Default)]
pub(crate) struct Outcome {
    pub(crate) argv: Option<Map<String, Value>>,
    pub(crate) env: BTreeMap<String, String>,
}

pub(crate) fn plan(settings: &Settings) -> Vec<Stage> {
    if settings.custom_workflow.is_some() {
        return vec![Stage::Custom];
    }
    let mut stages = vec![Stage::Hook(HookPoint::First)];
    for step in Step::ORDER {
        stages.push(Stage::Load(step));
        if step == Step::Argv {
            stages.push(Stage::ArgvFile);
        }
        stages.push(Stage::Hook(HookPoint::After(step)));
    }
    stages.push(Stage::Required);
    stages
}

/// Runs the plan without awaiting. Deferred hooks are an error here.
pub(crate) fn run_blocking(settings: &Settings, store: &mut dyn ConfigStore) -> Result<Outcome> {
    let mut ctx = LoadContext::new(settings);
    for stage in plan(settings) {
        tracing::trace!("stage {:?}", stage);
        match stage {
            Stage::Hook(point) => {
                if let Some(hook) = settings.hooks.get(&point) {
                    tracing::debug!("Running {} hook", point);
                    hook.run_blocking(store)?;
                }
            }
            Stage::Custom => {
                if let Some(workflow) = &settings.custom_workflow {
                    tracing::debug!("Running custom workflow");
                    workflow.run_blocking(store)?;
                }
            }
            other => run_stage(other, store, &mut ctx)?,
        }
    }
    Ok(finish(ctx))
}

/// Runs the plan, awaiting deferred hooks.
pub(crate) async fn run(settings: &Settings, store: &mut dyn ConfigStore) -> Result<Outcome> {
    let mut ctx = LoadContext::new(settings);
    for stage in plan(settings) {
        tracing::trace!("stage {:?}", stage);
        match stage {
            Stage::Hook(point) => {
                if let Some(hook) = settings.hooks.get(&point) {
                    tracing::debug!("Running {} hook", point);
                    hook.run(&mut *store).await?;
                }
            }
            Stage::Custom => {
                if let Some(workflow) = &settings.custom_workflow {
                    tracing::debug!("Running custom workflow");
                    workflow.run(&mut *store).await?;
                }
            }
            other => run_stage(other, &mut *store, &mut ctx)?,
        }
    }
    Ok(finish(ctx))
}

fn run_stage(stage: Stage, store: &mut dyn ConfigStore, ctx: &mut LoadContext<'_>) -> Result<()> {
    match stage {
        Stage::Load(step) => {
            tracing::debug!("Loading {} source", step);
            loader_for(step)(store, ctx)
        }
        Stage::ArgvFile => load_argv_file(store, ctx),
        Stage::Required => store.require_keys(&ctx.settings.required),
        Stage::Hook(_) | Stage::Custom => Ok(()),
    }
}

fn finish(ctx: LoadContext<'_>) -> Outcome {
    // Custom workflows skip the argv snapshot but still expose the environment.
    let env = match ctx.env {
        Some(env) => env,
        None => env_adapter(ctx.settings).snapshot(),
    };
    Outcome {
        argv: ctx.argv,
        env,
    }
}
