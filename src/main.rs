use anyhow::{Context, Result};
use clap::Parser;
use fieldmap_layout::constants::{DEFAULT_LABELS_FILE, DEFAULT_PROJECT_DIR};
use fieldmap_layout::{Cleanup, FieldLabels, LayoutOptions, plan_from_file};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "fieldmap",
    about = "Plan a print layout for a field polygon map",
    version
)]
struct Cli {
    /// GeoJSON file containing the field polygons
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Project file, directory or bare project name
    #[arg(short, long)]
    project_path: Option<String>,

    /// Farm name printed in the footer
    #[arg(long)]
    farm_name: Option<String>,

    /// Name of the print layout
    #[arg(short, long)]
    layout_name: Option<String>,

    /// Number of maps in the layout
    #[arg(long)]
    map_count: Option<usize>,

    /// Extra fields to show in the table
    #[arg(short, long, num_args = 1..)]
    table_fields: Option<Vec<String>>,

    /// Field used to colour code the map
    #[arg(short, long)]
    color_code: Option<String>,

    /// Field used to label the polygons
    #[arg(long)]
    label_data: Option<String>,

    /// Show areas in acres
    #[arg(long)]
    area_acres: bool,

    /// PDF file to export the layout to
    #[arg(long)]
    pdf: Option<PathBuf>,

    /// Field name to UI label file
    #[arg(long, default_value = DEFAULT_LABELS_FILE)]
    labels: PathBuf,

    /// JSON options file; command line flags override its values
    #[arg(long)]
    options: Option<PathBuf>,

    /// Directory for projects given by bare name
    #[arg(long, default_value = DEFAULT_PROJECT_DIR)]
    project_dir: PathBuf,

    /// Remove P/K index annotations from field names
    #[arg(long)]
    strip_index: bool,

    /// Drop fields without a soil sample
    #[arg(long)]
    drop_unsampled: bool,

    /// Write the plan here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Debug logging unless RUST_LOG is set
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Options file (or defaults) overlaid with the flags given
    fn layout_options(&self) -> Result<LayoutOptions> {
        let mut options = match &self.options {
            Some(path) => LayoutOptions::load(path)
                .with_context(|| format!("Failed to load options from {}", path.display()))?,
            None => LayoutOptions::default(),
        };

        if let Some(file) = &self.file {
            options.file = file.clone();
        }
        if let Some(project) = &self.project_path {
            options.project_path = project.clone();
        }
        if let Some(farm) = &self.farm_name {
            options.farm_name = Some(farm.clone());
        }
        if let Some(name) = &self.layout_name {
            options.layout_name = name.clone();
        }
        if let Some(count) = self.map_count {
            options.map_count = count;
        }
        if let Some(fields) = &self.table_fields {
            options.table_fields = fields.clone();
        }
        if let Some(code) = &self.color_code {
            options.color_code = Some(code.clone());
        }
        if let Some(label) = &self.label_data {
            options.label_data = Some(label.clone());
        }
        if self.area_acres {
            options.area_acres = true;
        }
        if let Some(pdf) = &self.pdf {
            options.pdf = Some(pdf.clone());
        }

        Ok(options)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let fallback = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
        .with_writer(std::io::stderr)
        .init();

    let options = cli.layout_options()?;
    let labels = FieldLabels::load(&cli.labels)
        .with_context(|| format!("Failed to load field labels from {}", cli.labels.display()))?;
    let cleanup = Cleanup {
        strip_index: cli.strip_index,
        drop_unsampled: cli.drop_unsampled,
    };
    let today = chrono::Local::now().date_naive();

    let plan = plan_from_file(&options, &labels, cleanup, today, &cli.project_dir)
        .with_context(|| format!("Failed to plan layout for {}", options.file.display()))?;
    let json = plan.to_json()?;

    match &cli.output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote layout plan to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
