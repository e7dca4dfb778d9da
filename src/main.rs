use colored_triangle::config::FAILURE_EXIT_CODE;
use colored_triangle::default_main;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let code = match default_main() {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            FAILURE_EXIT_CODE
        }
    };
    std::process::exit(code);
}
