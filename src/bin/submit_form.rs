// submit_form.rs – submit a saved evaluation form to the evaluator from the shell
//
// Usage: submit-form <form.html> [evaluator-url]
//
// Reads the seven controls out of the document the same way the hosted form
// does, runs one submission cycle and prints the rendered result fragment.
// EVALUATOR_URL / EVALUATOR_TIMEOUT_SECS apply when no URL is given.

use anyhow::{Context, Result, anyhow};
use loan_eval_client::config::Config;
use loan_eval_client::form::{HtmlForm, SubmitEvent};
use loan_eval_client::render::{DisplayRegion, RenderState};
use loan_eval_client::{EvaluationClient, SubmissionController, SubmissionOutcome};

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let document_path = args
        .next()
        .ok_or_else(|| anyhow!("usage: submit-form <form.html> [evaluator-url]"))?;

    let mut config = Config::from_env()?;
    if let Some(url) = args.next() {
        config = config.with_evaluator_url(url);
    }

    let html = std::fs::read_to_string(&document_path)
        .with_context(|| format!("Failed to read {}", document_path))?;
    let form = HtmlForm::parse(&html);

    let client = EvaluationClient::new(&config)?;
    println!("Submitting {} to {}", document_path, client.evaluate_url());
    println!("{}", "=".repeat(50));

    let controller = SubmissionController::new(client, DisplayRegion::new());
    let mut event = SubmitEvent::new();
    let outcome = controller.submit(&mut event, &form).await?;

    let rendered = match outcome {
        SubmissionOutcome::Rendered(state) => state,
        SubmissionOutcome::Superseded => controller.display().current(),
    };
    println!("{}", rendered.to_html());

    match rendered {
        RenderState::Resolved(Ok(view)) => {
            println!("{}", "=".repeat(50));
            println!("{} ({})", view.diagnosis, view.category);
            for (i, detail) in view.details.iter().enumerate() {
                println!("{}. {}", i + 1, detail);
            }
            Ok(())
        }
        RenderState::Resolved(Err(message)) => Err(anyhow!("Evaluation failed: {}", message)),
        other => Err(anyhow!("Submission did not resolve: {:?}", other)),
    }
}
