//! scms's main application entry point.
//! Parses the command line, sets up logging and runs the pipeline.

use scms::{
    cli::{get_args, Args},
    error::{default_error_handler, Result},
    logger::init_logger,
    processor::{PipelineContext, Processor},
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Builds the pipeline context once and processes the whole source tree.
fn run(args: Args) -> Result<()> {
    let ctx = PipelineContext::init(args.settings())?;
    let summary = Processor::new(&ctx).run()?;

    println!("Site generated in '{}' ({summary}).", ctx.dest_dir().display());
    Ok(())
}
