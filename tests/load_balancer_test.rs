//! Registration, dispatch and admission control.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use provider_balancer::load_balancer::Builder;
use provider_balancer::{AlgorithmKind, BalancerError, BasicProvider, LoadBalancer, Provider, ProviderId};

mod common;
use common::ScriptedProvider;

fn offline() -> Builder {
    LoadBalancer::builder().with_health_checks(false)
}

#[tokio::test]
async fn test_register_up_to_capacity() {
    let lb = offline().with_max_providers(10).build().unwrap();
    for _ in 0..10 {
        lb.register(Arc::new(BasicProvider::new())).unwrap();
    }
    assert_eq!(lb.count_available_providers(), 10);

    let err = lb.register(Arc::new(BasicProvider::new())).unwrap_err();
    assert_eq!(err, BalancerError::CapacityExceeded { max: 10 });
    assert_eq!(err.to_string(), "maximum capacity reached (10 providers)");
    assert_eq!(lb.count_total_providers(), 10);
}

#[tokio::test]
async fn test_duplicate_registration_rejected() {
    let lb = offline().build().unwrap();
    let provider = Arc::new(BasicProvider::new());
    lb.register(provider.clone()).unwrap();

    let err = lb.register(provider.clone()).unwrap_err();
    assert_eq!(err, BalancerError::AlreadyRegistered(provider.id().clone()));
    assert_eq!(lb.count_total_providers(), 1);
}

#[tokio::test]
async fn test_round_robin_order() {
    let lb = offline().build().unwrap();
    let providers: Vec<_> = (0..4).map(|_| Arc::new(BasicProvider::new())).collect();
    for provider in &providers {
        lb.register(provider.clone()).unwrap();
    }

    for i in 0..10 {
        assert_eq!(&lb.get().await.unwrap(), providers[i % 4].id());
    }
}

#[tokio::test]
async fn test_random_reaches_every_provider() {
    // Both providers are hit unless one of them is missed 100 times in a row:
    // probability 2 * 0.5^100 per run.
    let lb = offline().with_algorithm(AlgorithmKind::Random).build().unwrap();
    let p1 = Arc::new(BasicProvider::new());
    let p2 = Arc::new(BasicProvider::new());
    lb.register(p1.clone()).unwrap();
    lb.register(p2.clone()).unwrap();

    let mut distribution: HashMap<ProviderId, usize> = HashMap::new();
    for _ in 0..100 {
        *distribution.entry(lb.get().await.unwrap()).or_default() += 1;
    }
    assert!(distribution.get(p1.id()).copied().unwrap_or(0) > 0);
    assert!(distribution.get(p2.id()).copied().unwrap_or(0) > 0);
    assert_eq!(distribution.values().sum::<usize>(), 100);
}

#[tokio::test]
async fn test_register_then_unregister() {
    let lb = offline().build().unwrap();
    let provider = Arc::new(BasicProvider::new());
    lb.register(provider.clone()).unwrap();
    assert_eq!(lb.count_total_providers(), 1);

    assert!(lb.unregister(provider.as_ref()));
    assert_eq!(lb.count_total_providers(), 0);

    // Second call is a no-op.
    assert!(!lb.unregister(provider.as_ref()));
    assert_eq!(lb.count_total_providers(), 0);
}

#[tokio::test]
async fn test_unregister_matches_by_identity_token() {
    let lb = offline().build().unwrap();
    lb.register(Arc::new(BasicProvider::with_id("shared-id"))).unwrap();

    // A different instance carrying the same id is the same provider.
    assert!(lb.unregister(&BasicProvider::with_id("shared-id")));
    assert_eq!(lb.count_total_providers(), 0);
}

#[tokio::test]
async fn test_unregister_frees_capacity() {
    let lb = offline().with_max_providers(1).build().unwrap();
    let first = Arc::new(BasicProvider::new());
    lb.register(first.clone()).unwrap();
    assert!(lb.register(Arc::new(BasicProvider::new())).is_err());

    lb.unregister(first.as_ref());
    lb.register(Arc::new(BasicProvider::new())).unwrap();
    assert_eq!(lb.count_total_providers(), 1);
}

#[tokio::test]
async fn test_get_without_providers() {
    let lb = offline().build().unwrap();
    assert_eq!(lb.get().await.unwrap_err(), BalancerError::NoProvidersAvailable);
}

#[tokio::test]
async fn test_admission_control_rejects_second_concurrent_request() {
    let lb = offline().with_max_node_load(1).build().unwrap();
    let provider = ScriptedProvider::slow(Duration::from_millis(200));
    lb.register(provider.clone()).unwrap();

    // join! polls the first future first, so it takes the only slot.
    let (first, second) = tokio::join!(lb.get(), lb.get());

    assert_eq!(&first.unwrap(), provider.id());
    assert_eq!(
        second.unwrap_err(),
        BalancerError::TooManyRequests(provider.id().clone())
    );
    assert_eq!(provider.identify_calls(), 1);

    // Slot released once the first request finished.
    assert!(lb.get().await.is_ok());
    assert_eq!(provider.identify_calls(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_admission_control_across_threads() {
    let lb = Arc::new(offline().with_max_node_load(3).build().unwrap());
    let provider = ScriptedProvider::slow(Duration::from_millis(200));
    lb.register(provider.clone()).unwrap();

    let tasks: Vec<_> = (0..10)
        .map(|_| {
            let lb = lb.clone();
            tokio::spawn(async move { lb.get().await })
        })
        .collect();

    let mut served = 0;
    let mut rejected = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => served += 1,
            Err(BalancerError::TooManyRequests(_)) => rejected += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert!(served >= 1 && served <= 3, "served {served}");
    assert_eq!(served + rejected, 10);
    assert_eq!(provider.identify_calls(), served);
}

#[tokio::test]
async fn test_dispatch_timeout_is_reported() {
    let lb = offline()
        .with_dispatch_timeout(Some(Duration::from_millis(20)))
        .with_max_node_load(1)
        .build()
        .unwrap();
    let provider = ScriptedProvider::slow(Duration::from_secs(5));
    lb.register(provider.clone()).unwrap();

    let err = lb.get().await.unwrap_err();
    assert_eq!(
        err,
        BalancerError::DispatchTimeout {
            provider: provider.id().clone(),
            timeout: Duration::from_millis(20),
        }
    );
    // The timed-out request released its slot.
    assert!(matches!(
        lb.get().await.unwrap_err(),
        BalancerError::DispatchTimeout { .. }
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_round_robin_spreads_evenly_under_contention() {
    let lb = Arc::new(offline().with_max_node_load(1000).build().unwrap());
    let providers: Vec<_> = (0..4).map(|_| Arc::new(BasicProvider::new())).collect();
    for provider in &providers {
        lb.register(provider.clone()).unwrap();
    }

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let lb = lb.clone();
            tokio::spawn(async move {
                let mut ids = Vec::with_capacity(100);
                for _ in 0..100 {
                    ids.push(lb.get().await.unwrap());
                }
                ids
            })
        })
        .collect();

    let mut distribution: HashMap<ProviderId, usize> = HashMap::new();
    for task in tasks {
        for id in task.await.unwrap() {
            *distribution.entry(id).or_default() += 1;
        }
    }

    for provider in &providers {
        assert_eq!(distribution[provider.id()], 200);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_membership_changes_during_dispatch() {
    let lb = Arc::new(offline().with_max_providers(8).build().unwrap());
    let anchor = Arc::new(BasicProvider::new());
    lb.register(anchor.clone()).unwrap();

    let churn = {
        let lb = lb.clone();
        tokio::spawn(async move {
            for _ in 0..200 {
                let provider = Arc::new(BasicProvider::new());
                if lb.register(provider.clone()).is_ok() {
                    tokio::task::yield_now().await;
                    assert!(lb.unregister(provider.as_ref()));
                }
            }
        })
    };

    let dispatchers: Vec<_> = (0..4)
        .map(|_| {
            let lb = lb.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    // The anchor never leaves, so the pool is never empty.
                    assert!(lb.get().await.is_ok());
                    assert!(lb.count_total_providers() <= 8);
                }
            })
        })
        .collect();

    churn.await.unwrap();
    for task in dispatchers {
        task.await.unwrap();
    }
    assert_eq!(lb.count_total_providers(), 1);
}
