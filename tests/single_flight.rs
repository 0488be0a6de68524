//! Fifty concurrent clients requesting the same resource through a live
//! scheduler must collapse to a single upstream fetch, with every client
//! still receiving the correct body.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use hearth::proxy::{Blacklist, Cache, RequestHandler, Scheduler};

const CLIENTS: usize = 50;

#[test]
fn fifty_concurrent_clients_coalesce_into_one_upstream_fetch() {
    let origin = TcpListener::bind("127.0.0.1:0").unwrap();
    let origin_addr = origin.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_bg = Arc::clone(&hits);

    thread::spawn(move || {
        for stream in origin.incoming().take(1) {
            let mut stream = stream.unwrap();
            hits_bg.fetch_add(1, Ordering::SeqCst);

            // Hold the single in-flight fetch open long enough that every
            // client has a chance to queue up behind the per-fingerprint
            // mutex before the response is written.
            thread::sleep(Duration::from_millis(200));

            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            let body = b"shared response body";
            let resp = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n",
                body.len()
            );
            stream.write_all(resp.as_bytes()).unwrap();
            stream.write_all(body).unwrap();
        }
    });

    let dir = tempfile::tempdir().unwrap();
    let cache = Cache::new(dir.path(), 300).unwrap();
    let handler = Arc::new(RequestHandler::new(
        "proxy-single-flight-test",
        Blacklist::empty(),
        cache,
    ));
    let scheduler = Scheduler::new(Arc::clone(&handler), 16);
    let proxy = TcpListener::bind("127.0.0.1:0").unwrap();
    let proxy_addr = proxy.local_addr().unwrap();

    let accept_thread = {
        let scheduler = scheduler;
        thread::spawn(move || {
            for stream in proxy.incoming().take(CLIENTS) {
                let stream = stream.unwrap();
                scheduler.schedule_request(stream, "127.0.0.1".into());
            }
            scheduler.wait();
        })
    };

    let barrier = Arc::new(Barrier::new(CLIENTS));
    let clients: Vec<_> = (0..CLIENTS)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let req = format!(
                    "GET http://{}:{}/shared HTTP/1.1\r\n\r\n",
                    origin_addr.ip(),
                    origin_addr.port()
                );
                barrier.wait();
                let mut stream = std::net::TcpStream::connect(proxy_addr).unwrap();
                stream.write_all(req.as_bytes()).unwrap();
                stream.shutdown(std::net::Shutdown::Write).ok();

                let mut out = Vec::new();
                stream.read_to_end(&mut out).unwrap();
                String::from_utf8(out).unwrap()
            })
        })
        .collect();

    for client in clients {
        let response = client.join().unwrap();
        assert!(response.contains("shared response body"));
    }

    accept_thread.join().unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
