//! Tests for the cross-chain transfer pipeline

use ccip_mcp_server::{
    ccip::{
        default_registry, ChainSide, StepStatus, TransferError, TransferOrchestrator,
        TransferOutcome, TransferRequest, TransferStep,
    },
    mocks::{
        MockTransferClient, MOCK_RECEIVER_CONTRACT, MOCK_SENDER_CONTRACT, MOCK_TRACKING_URL,
    },
};
use secrecy::SecretString;

fn request(sender: &str, receiver: &str) -> TransferRequest {
    TransferRequest {
        sender_chain: sender.to_string(),
        receiver_chain: receiver.to_string(),
        private_key: SecretString::new("0xabc".to_string()),
        token_type: "CCIP-BnM".to_string(),
        token_amount: 0.1,
        eth_amount: 0.05,
        transfer_amount: 0.069,
        message: "hello".to_string(),
    }
}

#[tokio::test]
async fn successful_run_calls_each_step_once_in_order() {
    let client = MockTransferClient::new();
    let orchestrator = TransferOrchestrator::new(default_registry());

    let run = orchestrator.execute(&request("eth", "Avalanche"), &client).await;

    assert_eq!(client.steps_called(), TransferStep::ALL.to_vec());
    match &run.outcome {
        TransferOutcome::Success(receipt) => {
            assert_eq!(receipt.sender_contract, MOCK_SENDER_CONTRACT);
            assert_eq!(receipt.receiver_contract, MOCK_RECEIVER_CONTRACT);
            assert_eq!(receipt.transfer_handle, MOCK_TRACKING_URL);
        }
        other => panic!("expected success, got {:?}", other),
    }
    assert_eq!(run.progress.len(), 8);
    assert!(run
        .progress
        .records()
        .iter()
        .all(|r| matches!(r.status, StepStatus::Completed(_))));
}

#[tokio::test]
async fn steps_receive_resolved_chains_and_parameters() {
    let client = MockTransferClient::new();
    let orchestrator = TransferOrchestrator::new(default_registry());

    orchestrator
        .execute(&request("arbitrun", "base sepolia"), &client)
        .await;

    let calls = client.calls();
    let args: Vec<Vec<&str>> = calls
        .iter()
        .map(|c| c.args.iter().map(String::as_str).collect())
        .collect();
    assert_eq!(
        args,
        vec![
            vec!["arbitrum_sepolia"],
            vec!["arbitrum_sepolia", "CCIP-BnM", "0.1"],
            vec!["arbitrum_sepolia", "0.05"],
            vec!["arbitrum_sepolia", "base_sepolia"],
            vec!["base_sepolia"],
            vec!["base_sepolia", "arbitrum_sepolia"],
            vec!["arbitrum_sepolia", "base_sepolia"],
            vec!["arbitrum_sepolia", "base_sepolia", "hello", "0.069"],
        ]
    );
}

#[tokio::test]
async fn same_chain_fails_before_any_step() {
    let client = MockTransferClient::new();
    let orchestrator = TransferOrchestrator::new(default_registry());

    let run = orchestrator
        .execute(&request("ethereum", "ETH SEPOLIA"), &client)
        .await;

    assert_eq!(
        run.outcome,
        TransferOutcome::Failure(TransferError::SameChain {
            chain: "ethereum_sepolia".into()
        })
    );
    assert!(client.calls().is_empty());
    assert!(run.progress.is_empty());
    assert!(run.plan.is_none());
}

#[tokio::test]
async fn unresolvable_sender_is_reported_before_receiver() {
    let client = MockTransferClient::new();
    let orchestrator = TransferOrchestrator::new(default_registry());

    let run = orchestrator.execute(&request("xyz123", "qqq"), &client).await;

    assert_eq!(
        run.outcome,
        TransferOutcome::Failure(TransferError::UnresolvedChain {
            side: ChainSide::Sender,
            input: "xyz123".into()
        })
    );
    assert_eq!(run.outcome.failed_at_step(), None);
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn unresolvable_receiver_makes_no_calls() {
    let client = MockTransferClient::new();
    let orchestrator = TransferOrchestrator::new(default_registry());

    let run = orchestrator.execute(&request("base", "xyz123"), &client).await;

    assert!(matches!(
        run.outcome,
        TransferOutcome::Failure(TransferError::UnresolvedChain {
            side: ChainSide::Receiver,
            ..
        })
    ));
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn chain_resolution_is_checked_before_amounts() {
    let client = MockTransferClient::new();
    let orchestrator = TransferOrchestrator::new(default_registry());
    let mut req = request("xyz123", "base");
    req.eth_amount = 0.0;

    let run = orchestrator.execute(&req, &client).await;

    assert_eq!(
        run.outcome,
        TransferOutcome::Failure(TransferError::UnresolvedChain {
            side: ChainSide::Sender,
            input: "xyz123".into()
        })
    );
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn empty_sender_is_an_unresolved_chain() {
    let client = MockTransferClient::new();
    let orchestrator = TransferOrchestrator::new(default_registry());

    let run = orchestrator.execute(&request("", "base"), &client).await;

    assert_eq!(
        run.outcome,
        TransferOutcome::Failure(TransferError::UnresolvedChain {
            side: ChainSide::Sender,
            input: String::new()
        })
    );
}

#[tokio::test]
async fn invalid_amounts_are_rejected_after_chains_resolve() {
    let client = MockTransferClient::new();
    let orchestrator = TransferOrchestrator::new(default_registry());
    let mut req = request("eth", "base");
    req.transfer_amount = -1.0;

    let run = orchestrator.execute(&req, &client).await;

    assert!(matches!(
        run.outcome,
        TransferOutcome::Failure(TransferError::InvalidRequest(_))
    ));
    assert!(run.plan.is_none());
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn receiver_deploy_failure_stops_the_pipeline() {
    let client = MockTransferClient::failing_at(TransferStep::DeployReceiver, "execution reverted: out of gas");
    let orchestrator = TransferOrchestrator::new(default_registry());

    let run = orchestrator.execute(&request("base", "fuji"), &client).await;

    assert_eq!(run.outcome.failed_at_step(), Some(5));
    assert_eq!(
        run.outcome,
        TransferOutcome::Failure(TransferError::StepFailure {
            step: TransferStep::DeployReceiver,
            cause: "execution reverted: out of gas".into()
        })
    );
    let called = client.steps_called();
    assert_eq!(called.len(), 5);
    assert!(!called.contains(&TransferStep::AllowSource));
    assert!(!called.contains(&TransferStep::AllowSender));
    assert!(!called.contains(&TransferStep::Transfer));
}

#[tokio::test]
async fn progress_after_failure_at_step_k_holds_k_records() {
    for step in TransferStep::ALL {
        let client = MockTransferClient::failing_at(step, "boom");
        let orchestrator = TransferOrchestrator::new(default_registry());

        let run = orchestrator.execute(&request("arb", "avax"), &client).await;
        let k = step.index() as usize;

        assert_eq!(run.progress.len(), k, "failure at {}", step);
        assert_eq!(run.progress.completed().count(), k - 1);
        let last = run.progress.records().last().unwrap();
        assert_eq!(last.step, step);
        assert_eq!(last.status, StepStatus::Failed("boom".into()));
        assert_eq!(client.calls().len(), k);
    }
}

#[tokio::test]
async fn concurrent_runs_share_no_state() {
    let ok = MockTransferClient::new();
    let failing = MockTransferClient::failing_at(TransferStep::FundGas, "insufficient funds");
    let orchestrator = TransferOrchestrator::new(default_registry());
    let first = request("eth", "base");
    let second = request("avax", "arb");

    let (a, b) = tokio::join!(
        orchestrator.execute(&first, &ok),
        orchestrator.execute(&second, &failing)
    );

    assert!(a.outcome.is_success());
    assert_eq!(b.outcome.failed_at_step(), Some(3));
    assert_eq!(ok.calls().len(), 8);
    assert_eq!(failing.calls().len(), 3);
}
