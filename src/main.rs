use anyhow::Result;
use clap::Parser;

use dap_report::cli::{Cli, normalize};
use dap_report::{export, util, window};

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  util::init_logging(cli.verbose);

  // Phase 1: normalize CLI
  let cfg = normalize(cli)?;

  // Phase 2: resolve now
  let now_opt = window::parse_now_override(cfg.now_override.as_deref());

  // Phase 3: fetch every (report, month) and write the export
  export::run(&cfg, now_opt)
}
