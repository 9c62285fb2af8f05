//! Performance benchmarks for the validation pass.
//!
//! Compares reading variables by hand against declaring them and running
//! the full validation pass, for a valid and an invalid environment.

use criterion::{criterion_group, criterion_main, Criterion};
use envspec::env::EnvSource;
use envspec::prelude::*;
use std::hint::black_box;
use std::time::Duration;

fn valid_env() -> MockEnv {
    MockEnv::new()
        .with_env("JWT_SECRET", "this-is-a-very-long-secret-key-with-more-than-32-chars")
        .with_env("DATABASE_URL", "postgres://db.example.org:5432/app")
        .with_env("REDIS_PRIMARY_SERVICE_HOST", "10.0.0.12")
        .with_env("REDIS_PRIMARY_SERVICE_PORT", "6379")
        .with_env("SMTP_PORT", "587")
        .with_env("REQUEST_TIMEOUT", "PT30S")
        .with_env("WORKERS", "8")
        .with_env("SAMPLE_RATE", "0.25")
        .with_env("DEBUG", "false")
}

fn invalid_env() -> MockEnv {
    MockEnv::new()
        .with_env("JWT_SECRET", "short")
        .with_env("DATABASE_URL", "not a url")
        .with_env("REDIS_PRIMARY_SERVICE_HOST", "10.0.0.12")
        .with_env("SMTP_PORT", "99999")
        .with_env("REQUEST_TIMEOUT", "30s")
        .with_env("WORKERS", "0")
        .with_env("DEBUG", "maybe")
}

// =============================================================================
// Manual reading (baseline)
// =============================================================================

fn load_manually(env: &MockEnv) -> Option<(String, String, u16, i64, f64, bool)> {
    let jwt_secret = env.get_env("JWT_SECRET").filter(|s| s.len() >= 32)?;
    let database_url = env.get_env("DATABASE_URL")?;
    let smtp_port = env.get_env("SMTP_PORT")?.parse::<u16>().ok()?;
    let workers = env.get_env("WORKERS")?.parse::<i64>().ok().filter(|w| *w >= 1)?;
    let sample_rate = env.get_env("SAMPLE_RATE")?.parse::<f64>().ok()?;
    let debug = env.get_env("DEBUG")?.parse::<bool>().ok()?;
    Some((jwt_secret, database_url, smtp_port, workers, sample_rate, debug))
}

// =============================================================================
// Declared variables
// =============================================================================

fn declare_all(env: &Environment) -> Result<(), Error> {
    string(env, "JWT_SECRET", "token signing secret")
        .length(Some(32), None)
        .sensitive()
        .declare()?;
    url(env, "DATABASE_URL", "database connection URL")
        .protocols(["postgres"])
        .declare()?;
    kubernetes_address(env, "redis-primary", "Redis primary").declare_optional()?;
    network_port_number(env, "SMTP_PORT", "SMTP port").declare()?;
    duration(env, "REQUEST_TIMEOUT", "request timeout")
        .max(Duration::from_secs(300))
        .declare()?;
    integer(env, "WORKERS", "worker count").min(1).declare()?;
    number(env, "SAMPLE_RATE", "trace sample rate")
        .min(0.0)
        .max(1.0)
        .default(1.0)
        .declare()?;
    boolean(env, "DEBUG", "debug output").default(false).declare()?;
    Ok(())
}

fn bench_declare(c: &mut Criterion) {
    c.bench_function("declare 8 variables", |b| {
        b.iter(|| {
            let env = Environment::with_source(MockEnv::new());
            declare_all(black_box(&env)).unwrap();
            black_box(env)
        })
    });
}

fn bench_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("validation_pass");

    group.bench_function("manual (baseline)", |b| {
        let env = valid_env();
        b.iter(|| black_box(load_manually(black_box(&env))))
    });

    group.bench_function("declared, valid", |b| {
        b.iter(|| {
            let env = Environment::with_source(valid_env());
            declare_all(&env).unwrap();
            black_box(env.try_initialize().unwrap())
        })
    });

    group.bench_function("declared, invalid", |b| {
        b.iter(|| {
            let env = Environment::with_source(invalid_env());
            declare_all(&env).unwrap();
            black_box(env.try_initialize().unwrap_err())
        })
    });

    group.finish();
}

fn bench_summary(c: &mut Criterion) {
    let env = Environment::with_source(invalid_env());
    declare_all(&env).unwrap();
    let _ = env.try_initialize();
    let report = env.validate().unwrap();
    let options = SummaryOptions::no_color();

    c.bench_function("render summary", |b| {
        b.iter(|| black_box(envspec::render_summary(black_box(&report.results), &options)))
    });
}

criterion_group!(benches, bench_declare, bench_validation, bench_summary);
criterion_main!(benches);
