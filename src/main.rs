use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use wb_sanity::{
    CommandRunner, Config, DryRunRunner, FreeSurfer, Hemisphere, LabelSelection, MappingMethod,
    ProcessRunner, Projection, ProjectionMethod, ProjectionSummary, RegionSpec, Registration,
    SurfaceInterpolation, Vol2SurfRequest, Workbench, logging,
};

#[derive(Parser, Debug)]
#[command(name = "wb-sanity")]
#[command(about = "Relabel atlases and project volumes onto surfaces")]
#[command(version)]
struct Cli {
    /// Path to wb_command (default: $WB_COMMAND, then wb_command on PATH)
    #[arg(long, global = true, value_name = "PATH")]
    wb_command: Option<PathBuf>,

    /// Print the external commands instead of running them
    #[arg(long, global = true)]
    dry_run: bool,

    /// Log level (error, warn, info, debug, trace). Falls back to RUST_LOG, then info
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Keep only selected regions of a .dlabel.nii atlas
    LabelMap {
        input: PathBuf,
        output: PathBuf,
        /// Integer label to retain (repeatable)
        #[arg(long = "label", required = true, num_args = 1..)]
        labels: Vec<i64>,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        fill_value: f64,
    },
    /// Paint values from a region CSV (with an `Index` column) onto an atlas
    ScalarMap {
        input: PathBuf,
        region_spec: PathBuf,
        output: PathBuf,
        /// Column of the CSV holding the values
        #[arg(long = "value")]
        value_name: String,
        /// Reference .dscalar.nii used as the output template
        #[arg(long = "template")]
        scalar_img: PathBuf,
        /// Restrict to these labels (repeatable); all regions by default
        #[arg(long = "label", num_args = 1..)]
        labels: Option<Vec<i64>>,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        fill_value: f64,
    },
    /// Project a NIfTI volume onto a surface as a metric
    VolToMetric {
        volume: PathBuf,
        surface: PathBuf,
        output: PathBuf,
        /// trilinear, enclosing or cubic
        #[arg(long, default_value = "trilinear")]
        method: MappingMethod,
    },
    /// Project a labelled NIfTI volume onto a surface as a .label.gii
    VolToLabel {
        volume: PathBuf,
        surface: PathBuf,
        label_file: PathBuf,
        output: PathBuf,
    },
    /// Resample a metric to a new mesh with area correction
    Resample {
        input: PathBuf,
        current_sphere: PathBuf,
        new_sphere: PathBuf,
        output: PathBuf,
        current_area: PathBuf,
        new_area: PathBuf,
    },
    /// Project a volume with FreeSurfer's mri_vol2surf
    VolToSurf(VolToSurfArgs),
}

#[derive(Args, Debug)]
struct VolToSurfArgs {
    volume: PathBuf,
    output: PathBuf,
    /// lh or rh
    #[arg(long)]
    hemi: Hemisphere,
    #[command(flatten)]
    registration: RegistrationArgs,
    #[arg(long, default_value = "fsaverage")]
    target_subject: String,
    /// frac (fraction of thickness) or dist (mm)
    #[arg(long, default_value = "frac")]
    proj_method: ProjectionMethod,
    #[command(flatten)]
    projection: ProjectionArgs,
    /// nearest or trilinear
    #[arg(long, default_value = "nearest")]
    interp: SurfaceInterpolation,
    /// Source surface name (white by default)
    #[arg(long)]
    surf: Option<String>,
    /// Surface smoothing FWHM in mm
    #[arg(long)]
    fwhm: Option<f64>,
    /// Subjects directory (default: $SUBJECTS_DIR)
    #[arg(long)]
    sd: Option<PathBuf>,
    /// FreeSurfer install (default: $FREESURFER_HOME)
    #[arg(long, value_name = "PATH")]
    freesurfer_home: Option<PathBuf>,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct RegistrationArgs {
    /// Register using the header geometry of SUBJECT
    #[arg(long, value_name = "SUBJECT")]
    regheader: Option<String>,
    /// Registration file (register.dat or .lta)
    #[arg(long, value_name = "FILE")]
    reg: Option<PathBuf>,
    /// Volume is already in MNI152 space
    #[arg(long)]
    mni152reg: bool,
}

impl RegistrationArgs {
    fn registration(self) -> Registration {
        match (self.regheader, self.reg) {
            (Some(subject), _) => Registration::Header { subject },
            (None, Some(file)) => Registration::File(file),
            (None, None) => Registration::Mni152,
        }
    }
}

#[derive(Args, Debug)]
#[group(multiple = false)]
struct ProjectionArgs {
    /// Sample a single depth (default 0.5)
    #[arg(long, allow_hyphen_values = true)]
    proj: Option<f64>,
    /// Average samples from MIN to MAX in steps of DELTA
    #[arg(long, num_args = 3, value_names = ["MIN", "MAX", "DELTA"], allow_hyphen_values = true)]
    proj_avg: Option<Vec<f64>>,
    /// Maximum of samples from MIN to MAX in steps of DELTA
    #[arg(long, num_args = 3, value_names = ["MIN", "MAX", "DELTA"], allow_hyphen_values = true)]
    proj_max: Option<Vec<f64>>,
}

impl ProjectionArgs {
    fn summary(&self) -> ProjectionSummary {
        if let Some(&[min, max, delta]) = self.proj_avg.as_deref() {
            return ProjectionSummary::Average { min, max, delta };
        }
        if let Some(&[min, max, delta]) = self.proj_max.as_deref() {
            return ProjectionSummary::Maximum { min, max, delta };
        }
        self.proj.map(ProjectionSummary::Point).unwrap_or_default()
    }
}

async fn execute<R: CommandRunner>(command: Commands, config: &Config, runner: R) -> Result<()> {
    let wb = Workbench::new(&config.wb_command, runner);

    match command {
        Commands::LabelMap {
            input,
            output,
            labels,
            fill_value,
        } => {
            wb.make_label_map(&input, &labels, &output, fill_value)
                .await
                .with_context(|| format!("creating label map from {}", input.display()))?;
            info!("wrote {}", output.display());
        }
        Commands::ScalarMap {
            input,
            region_spec,
            output,
            value_name,
            scalar_img,
            labels,
            fill_value,
        } => {
            let spec = RegionSpec::from_path(&region_spec)
                .with_context(|| format!("reading {}", region_spec.display()))?;
            let selection = LabelSelection {
                label_numbers: labels,
                fill_value,
            };
            wb.make_scalar_map(&input, &spec, &value_name, &output, &scalar_img, &selection)
                .await
                .with_context(|| format!("creating scalar map from {}", input.display()))?;
            info!("wrote {}", output.display());
        }
        Commands::VolToMetric {
            volume,
            surface,
            output,
            method,
        } => {
            let written = wb.vol_to_metric(&volume, &surface, &output, method).await?;
            info!("wrote {}", written.display());
        }
        Commands::VolToLabel {
            volume,
            surface,
            label_file,
            output,
        } => {
            let written = wb
                .vol_to_label(&volume, &surface, &label_file, &output)
                .await?;
            info!("wrote {}", written.display());
        }
        Commands::Resample {
            input,
            current_sphere,
            new_sphere,
            output,
            current_area,
            new_area,
        } => {
            let written = wb
                .resample_metric(
                    &input,
                    &current_sphere,
                    &new_sphere,
                    &output,
                    &current_area,
                    &new_area,
                )
                .await?;
            info!("wrote {}", written.display());
        }
        Commands::VolToSurf(args) => {
            let config = config.clone().with_freesurfer_home(args.freesurfer_home);
            let freesurfer = FreeSurfer::from_home(config.freesurfer_home, wb.into_runner())?;

            let projection = Projection::new(args.proj_method, args.projection.summary());
            let mut request = Vol2SurfRequest::new(
                args.volume,
                args.output,
                args.hemi,
                args.registration.registration(),
            )
            .with_target_subject(args.target_subject)
            .with_projection(projection)
            .with_interpolation(args.interp);
            if let Some(surface) = args.surf {
                request = request.with_surface(surface);
            }
            if let Some(fwhm) = args.fwhm {
                request = request.with_smoothing(fwhm);
            }
            if let Some(dir) = args.sd {
                request = request.with_subjects_dir(dir);
            }

            let written = freesurfer.vol_to_surf(&request).await?;
            info!("wrote {}", written.display());
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::initialize_logging(cli.log_level.as_deref());

    let config = Config::from_env()
        .with_wb_command(cli.wb_command)
        .with_dry_run(cli.dry_run);

    if config.dry_run {
        let runner = DryRunRunner::new();
        execute(cli.command, &config, runner.clone()).await?;
        for command in runner.commands() {
            println!("{command}");
        }
    } else {
        execute(cli.command, &config, ProcessRunner).await?;
    }
    Ok(())
}
