// src/ccip/report.rs
//
// Prose payloads returned by the two tools. Step lines use the fixed shapes
// "Step k/8: ..." and "Step k/8 done: ..." / "Step k/8 failed: ...", and a
// failure always carries "Failed at step: k/8" or "Failed during: <stage>"
// so callers can recover the outcome from the text alone.

use std::fmt::Write;

use super::models::{
    StepStatus, TransferError, TransferOutcome, TransferReceipt, TransferRun, SUPPORTED_TOKENS,
};
use super::registry::ChainRegistry;

pub fn render_resolution(input: &str, resolved: Option<&str>, registry: &ChainRegistry) -> String {
    match resolved {
        Some(chain) => format!("✅ **Chain Found:** `{}` → `{}`", input, chain),
        None => format!(
            "❌ **No Match:** `{}`\n\nSupported chains: {}",
            input,
            supported_chains(registry)
        ),
    }
}

pub fn render_transfer(run: &TransferRun, registry: &ChainRegistry) -> String {
    let mut text = String::new();

    if let Some(plan) = &run.plan {
        let _ = writeln!(text, "🚀 **CCIP Cross-Chain Transfer**\n");
        let _ = writeln!(text, "• **From:** {}", plan.sender_chain);
        let _ = writeln!(text, "• **To:** {}", plan.receiver_chain);
        let _ = writeln!(text, "• **Token:** {}", plan.token_type);
        let _ = writeln!(text, "• **Amount:** {}", plan.transfer_amount);
        let _ = writeln!(text, "• **Message:** \"{}\"", plan.message);
        let _ = writeln!(
            text,
            "• **Started:** {}\n",
            run.progress.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }

    for record in run.progress.records() {
        let _ = writeln!(text, "🔄 Step {}/8: {}", record.index(), record.description);
        match &record.status {
            StepStatus::Completed(artifact) => {
                let _ = writeln!(text, "✅ Step {}/8 done: `{}`\n", record.index(), artifact);
            }
            StepStatus::Failed(cause) => {
                let _ = writeln!(text, "❌ Step {}/8 failed: {}\n", record.index(), cause);
            }
            StepStatus::Attempted => {}
        }
    }

    match &run.outcome {
        TransferOutcome::Success(receipt) => write_success(&mut text, run, receipt),
        TransferOutcome::Failure(err) => {
            let _ = writeln!(text, "❌ **Transfer Failed**\n");
            match err.failed_at_step() {
                Some(index) => {
                    let _ = writeln!(text, "**Failed at step:** {}/8", index);
                }
                None => {
                    let stage = match err {
                        TransferError::ClientSetup(_) => "client setup",
                        _ => "validation",
                    };
                    let _ = writeln!(text, "**Failed during:** {}", stage);
                }
            }
            let _ = writeln!(text, "**Error:** {}\n", err.cause());

            let completed: Vec<String> = run
                .progress
                .completed()
                .map(|r| format!("step {} (`{}`)", r.index(), r.artifact().unwrap_or_default()))
                .collect();
            if !completed.is_empty() {
                let _ = writeln!(
                    text,
                    "⚠️ Not rolled back, already on-chain: {}\n",
                    completed.join(", ")
                );
            }

            write_troubleshooting(&mut text, registry);
        }
    }

    text
}

/// Reply for a tool name the server does not expose.
pub fn render_unknown_tool(err: &TransferError, registry: &ChainRegistry) -> String {
    let name = match err {
        TransferError::UnknownOperation(name) => name.as_str(),
        _ => "",
    };
    let mut text = format!("❌ Unknown tool: {}\n\n", name);
    let _ = writeln!(
        text,
        "Available tools: execute_ccip_transfer, find_supported_chain\n"
    );
    let _ = writeln!(text, "**Supported Chains:** {}", supported_chains(registry));
    let _ = write!(text, "**Supported Tokens:** {}", SUPPORTED_TOKENS.join(", "));
    text
}

fn write_troubleshooting(text: &mut String, registry: &ChainRegistry) {
    let _ = writeln!(text, "**Troubleshooting:**");
    let _ = writeln!(text, "• Check the private key holds enough funds on both chains");
    let _ = writeln!(text, "• Verify the chain names are correct");
    let _ = writeln!(text, "• Make sure the token type is supported");
    let _ = writeln!(text, "• Check network connectivity\n");
    let _ = writeln!(text, "**Supported Chains:** {}", supported_chains(registry));
    let _ = write!(text, "**Supported Tokens:** {}", SUPPORTED_TOKENS.join(", "));
}

fn write_success(text: &mut String, run: &TransferRun, receipt: &TransferReceipt) {
    let _ = writeln!(text, "🎉 **TRANSFER COMPLETE!**\n");
    let _ = writeln!(text, "🔗 **Track Transfer:** {}\n", receipt.transfer_handle);
    let _ = writeln!(text, "📊 **Summary:**");
    let _ = writeln!(text, "• **Sender Contract:** `{}`", receipt.sender_contract);
    let _ = writeln!(text, "• **Receiver Contract:** `{}`", receipt.receiver_contract);
    if let Some(plan) = &run.plan {
        let _ = writeln!(
            text,
            "• **Amount:** {} {}",
            plan.transfer_amount, plan.token_type
        );
    }
    let _ = write!(text, "\n🎯 **All 8 steps completed successfully!**");
}

fn supported_chains(registry: &ChainRegistry) -> String {
    registry.chain_ids().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ccip::models::TransferProgress;
    use crate::ccip::registry::default_registry;

    #[test]
    fn unresolved_chain_lists_every_canonical_chain() {
        let text = render_resolution("xyz123", None, default_registry());
        assert!(text.contains("No Match"));
        for chain in default_registry().chain_ids() {
            assert!(text.contains(chain));
        }
    }

    #[test]
    fn validation_failure_names_stage_and_troubleshooting_lists() {
        let run = TransferRun {
            plan: None,
            progress: TransferProgress::new(),
            outcome: TransferOutcome::Failure(TransferError::SameChain {
                chain: "base_sepolia".into(),
            }),
        };
        let text = render_transfer(&run, default_registry());
        assert!(text.contains("Transfer Failed"));
        assert!(text.contains("**Failed during:** validation"));
        assert!(text.contains("must be different"));
        assert!(text.contains("avalanche_fuji"));
        assert!(text.contains("CCIP-LnM"));
        assert!(!text.contains("Step 1/8"));
    }

    #[test]
    fn unknown_tool_lists_chains_and_tokens() {
        let err = TransferError::UnknownOperation("bridge_everything".into());
        let text = render_unknown_tool(&err, default_registry());
        assert!(text.starts_with("❌ Unknown tool: bridge_everything"));
        assert!(text.contains("ethereum_sepolia, base_sepolia, arbitrum_sepolia, avalanche_fuji"));
        assert!(text.contains("LINK, CCIP-BnM, USDC, CCIP-LnM"));
    }
}
