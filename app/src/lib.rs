//! Airfare Predictor - Interactive Prediction Form
//!
//! The last stage of the fare prediction workflow. It loads the best model and
//! the fitted preprocessor written by the trainer, then asks for flight details
//! and prints a predicted price until the user stops.
//!
//! # Architecture Overview
//!
//! ```text
//! -------------------------------------------------------------------
//! |                      airfare-predictor                          |
//! |                                                                 |
//! |  ---------------  ---------------------  ---------------------  |
//! |  |    state    |  |       form        |  |      prompt       |  |
//! |  |  OnceCell   |  |  field specs      |  |  Select / Input   |  |
//! |  |  model +    |->|  FormSubmission   |<-|  Confirm          |  |
//! |  |  preproc.   |  |  Predictor        |  |  (FormInput)      |  |
//! |  ---------------  ---------------------  ---------------------  |
//! |         ^                                                       |
//! |         |  models/best_model.bin, models/preprocessor.bin       |
//! -------------------------------------------------------------------
//! ```
//!
//! # Failure Handling
//!
//! Missing or unreadable artifacts end the process before the first prompt.
//! A failed prediction is printed as `Error making prediction: ...` and the
//! session continues.

pub mod error;
pub mod form;
pub mod prompt;
pub mod state;

pub use error::{PredictorError, Result};
pub use form::{FormSubmission, Predictor, PredictorState, format_price};
pub use prompt::{FormInput, TerminalForm};
pub use state::{LoadedArtifacts, artifacts};

use fare_processing::ProjectPaths;
use std::io::Write;
use tracing::info;

/// Price submissions from `input` until it declines another round.
///
/// Returns the number of submissions handled. Only prompt and output failures
/// end the loop early.
pub fn run_session<I, W>(
    predictor: &mut Predictor<'_>,
    input: &mut I,
    out: &mut W,
) -> Result<usize>
where
    I: FormInput,
    W: Write,
{
    let mut submissions = 0;
    loop {
        let submission = input.read_submission()?;
        let message = predictor.submit(&submission);
        writeln!(out, "{}", message)?;
        submissions += 1;

        if !input.predict_again()? {
            break;
        }
    }
    Ok(submissions)
}

/// Load the shared artifacts under `paths` and run an interactive session on
/// the terminal.
pub fn run(paths: &ProjectPaths) -> Result<()> {
    let artifacts = artifacts(paths)?;
    println!(
        "Flight Price Predictor ({} from {})",
        artifacts.model_name(),
        artifacts.model_path().display()
    );

    let mut predictor = Predictor::new(artifacts);
    let mut form = TerminalForm::new();
    let mut stdout = std::io::stdout();
    let submissions = run_session(&mut predictor, &mut form, &mut stdout)?;

    info!("Session finished after {} predictions", submissions);
    Ok(())
}
