use anyhow::Result;
use phish_detect::adapters::WhoisClient;
use phish_detect::domain::ports::WhoisLookup;
use phish_detect::LookupError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

type Answer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// 在本機模擬 WHOIS：依查詢字串回傳固定內容，並記錄被查詢次數
async fn spawn_whois(answer: Answer) -> Result<(String, Arc<AtomicUsize>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?.to_string();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let answer = answer.clone();
            let counter = counter.clone();
            tokio::spawn(async move {
                let (reader, mut writer) = stream.into_split();
                let mut query = String::new();
                if BufReader::new(reader).read_line(&mut query).await.is_ok() {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let response = answer(query.trim());
                    let _ = writer.write_all(response.as_bytes()).await;
                    let _ = writer.shutdown().await;
                }
            });
        }
    });

    Ok((address, hits))
}

struct Servers {
    root: String,
    registrar_hits: Arc<AtomicUsize>,
}

/// root → registry → registrar，三台皆在本機
async fn spawn_hierarchy() -> Result<Servers> {
    let (registrar, registrar_hits) = spawn_whois(Arc::new(|query: &str| match query {
        "partial.com" => "Domain Name: PARTIAL.COM\nRegistrar Registration Expiration Date: 2031-02-03T00:00:00Z\n".to_string(),
        _ => "Creation Date: 1990-01-01T00:00:00Z\nRegistrar Registration Expiration Date: 1991-01-01T00:00:00Z\n".to_string(),
    }))
    .await?;

    let (registry, _) = spawn_whois(Arc::new(move |query: &str| match query {
        "example.com" => format!(
            "   Domain Name: EXAMPLE.COM\n   Registrar WHOIS Server: {}\n   Creation Date: 1995-08-14T04:00:00Z\n   Registry Expiry Date: 2026-08-13T04:00:00Z\n",
            registrar
        ),
        "fresh.com" => "Domain Name: FRESH.COM\nCreation Date: 2024-03-01T00:00:00Z\nRegistry Expiry Date: 2025-03-01T00:00:00Z\n".to_string(),
        "partial.com" => format!(
            "Domain Name: PARTIAL.COM\nRegistrar WHOIS Server: {}\nCreation Date: 2001-02-03T00:00:00Z\n",
            registrar
        ),
        _ => format!("No match for \"{}\".\n", query.to_uppercase()),
    }))
    .await?;

    let (root, _) = spawn_whois(Arc::new(move |query: &str| {
        if query.ends_with(".com") {
            format!("% IANA WHOIS server\n\nrefer:        {}\n\ndomain:       COM\n", registry)
        } else {
            "% IANA WHOIS server\n% This query returned 0 objects.\n".to_string()
        }
    }))
    .await?;

    Ok(Servers {
        root,
        registrar_hits,
    })
}

#[tokio::test]
async fn test_lookup_follows_root_referral() -> Result<()> {
    let servers = spawn_hierarchy().await?;
    let client = WhoisClient::new(servers.root, Duration::from_secs(5))?;

    let record = client.lookup("example.com").await?;
    assert!(record.registration_days().unwrap() > 365);

    let fresh = client.lookup("fresh.com").await?;
    assert_eq!(fresh.registration_days(), Some(365));

    // both dates came from the registry, the registrar stays untouched
    assert_eq!(servers.registrar_hits.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn test_partial_registry_answer_asks_registrar() -> Result<()> {
    let servers = spawn_hierarchy().await?;
    let client = WhoisClient::new(servers.root, Duration::from_secs(5))?;

    let record = client.lookup("partial.com").await?;
    assert!(record.is_complete());
    assert_eq!(
        record.creation_date.map(|date| date.date().to_string()),
        Some("2001-02-03".to_string())
    );
    assert_eq!(
        record.expiration_date.map(|date| date.date().to_string()),
        Some("2031-02-03".to_string())
    );
    assert_eq!(servers.registrar_hits.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_unknown_domain_has_no_dates() -> Result<()> {
    let servers = spawn_hierarchy().await?;
    let client = WhoisClient::new(servers.root, Duration::from_secs(5))?;

    let record = client.lookup("missing.com").await?;
    assert_eq!(record.registration_days(), None);
    Ok(())
}

#[tokio::test]
async fn test_unknown_tld_has_no_dates() -> Result<()> {
    let servers = spawn_hierarchy().await?;
    let client = WhoisClient::new(servers.root, Duration::from_secs(5))?;

    let record = client.lookup("example.zz").await?;
    assert!(!record.is_complete());
    assert_eq!(record.registration_days(), None);
    Ok(())
}

#[tokio::test]
async fn test_silent_server_times_out() -> Result<()> {
    // accepts connections but never answers
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?.to_string();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    let client = WhoisClient::new(address, Duration::from_millis(300))?;
    let err = client.lookup("example.com").await.unwrap_err();
    assert!(matches!(err, LookupError::Timeout(_)));
    Ok(())
}
