use mimalloc::MiMalloc;
use std::process::ExitCode;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> ExitCode {
    gene_depth::init_tracing();
    match gene_depth::cli::parse_from_env().and_then(gene_depth::run_from_args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("gene-depth: {error}");
            ExitCode::from(1)
        }
    }
}
