//! envrun CLI
//!
//! Usage:
//!   envrun printenv
//!   envrun -f prod.env my-server --port 8080
//!   envrun -o -f defaults.env -- sh -c 'echo $GREETING'
//!   envrun --dry-run my-server

use envrun::{
    compose, EnvFile, EnvRunArgs, Environment, LaunchPlan, Launcher, ProcessOutcome,
    FAILURE_EXIT_CODE,
};

#[tokio::main]
async fn main() {
    let args: EnvRunArgs = argh::from_env();

    // Initialize logging
    let env = env_logger::Env::default().default_filter_or(args.log_level.as_str());
    env_logger::init_from_env(env);

    // Reject a missing command before touching the definitions file
    let precedence = args.precedence();
    let plan = match LaunchPlan::new(args.command) {
        Ok(plan) => plan,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(FAILURE_EXIT_CODE);
        }
    };

    // Load definitions; the file is closed once parsing returns
    log::debug!("Loading definitions file: {}", args.file);
    let env_file = match EnvFile::from_file(&args.file) {
        Ok(env_file) => env_file,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(FAILURE_EXIT_CODE);
        }
    };

    let ambient = Environment::from_process();
    let resolved = compose(&env_file.vars, &ambient, precedence);
    log::debug!(
        "Computed {} variables ({} from file, {} unresolved placeholders)",
        resolved.env.len(),
        env_file.vars.len(),
        resolved.issues.len()
    );

    let plan = plan.with_env(resolved.env);

    if args.dry_run {
        print!("{}", plan);
        return;
    }

    let launcher = Launcher::new(plan.process_config());
    let code = match launcher.run().await {
        Ok(ProcessOutcome::Exited { code }) => {
            if code != 0 {
                log::info!("{} exited with code {}", plan.executable, code);
            }
            code
        }
        Ok(outcome) => {
            log::error!("Non-exit error running {}: {}", plan.executable, outcome);
            outcome.exit_code()
        }
        Err(e) => {
            log::error!("{}", e);
            FAILURE_EXIT_CODE
        }
    };

    std::process::exit(code);
}
