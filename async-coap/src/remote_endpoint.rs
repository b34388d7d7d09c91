// Copyright 2019 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

use super::*;
use crate::link_format::WebLink;
use crate::message::{MessageWrite, OwnedImmutableMessage};
use crate::send_desc::WithPayload;
use crate::uri::RelRef;
use crate::UriBuf;
use std::option::IntoIter as OptionIntoIter;

/// Conditional/content options recognized by the [`RemoteEndpointExt::get`],
/// [`post`](RemoteEndpointExt::post), [`put`](RemoteEndpointExt::put), and
/// [`delete`](RemoteEndpointExt::delete) client facade methods.
///
/// All fields default to "not present": an empty `RequestOptions::default()` sends a request
/// with none of these options set.
#[derive(Debug, Default, Clone)]
pub struct RequestOptions {
    /// Value for an outbound `Content-Format` option, describing the format of the request
    /// payload (relevant to `post`/`put`).
    pub content_format: Option<ContentFormat>,
    /// Value for an outbound `Accept` option, describing the format the response payload
    /// should be in.
    pub accept: Option<ContentFormat>,
    /// Entity tags for an outbound `If-Match` option. Empty means the option is omitted.
    pub if_match: Vec<ETag>,
    /// Whether to include an `If-None-Match` option.
    pub if_none_match: bool,
}

/// Converts a flag into the zero-or-one-element iterator `add_option_iter` expects.
fn if_none_match_iter(flag: bool) -> OptionIntoIter<()> {
    if flag {
        Some(())
    } else {
        None
    }
    .into_iter()
}

/// An object that represents a remote CoAP endpoint with a default, overridable path.
///
/// # Example
///
/// ```
/// # #![feature(async_await)]
/// #
/// # use std::sync::Arc;
/// # use futures::{prelude::*,executor::LocalPool,task::LocalSpawnExt};
/// # use async_coap::prelude::*;
/// # use async_coap::datagram::{DatagramLocalEndpoint,AllowStdUdpSocket};
/// #
/// # // Create our asynchronous socket. In this case, it is just an
/// # // (inefficient) wrapper around the standard rust `UdpSocket`,
/// # // but that is quite adequate in this case.
/// # let socket = AllowStdUdpSocket::bind("[::]:0").expect("UDP bind failed");
/// #
/// # // Create a new local endpoint from the socket we just created,
/// # // wrapping it in a `Arc<>` to ensure it can live long enough.
/// # let local_endpoint = Arc::new(DatagramLocalEndpoint::new(socket));
/// #
/// # // Create a local execution pool for running our local endpoint.
/// # let mut pool = LocalPool::new();
/// #
/// # // Add our local endpoint to the pool, so that it
/// # // can receive packets.
/// # pool.spawner().spawn_local(local_endpoint
/// #     .clone()
/// #     .receive_loop_arc(null_receiver!())
/// #     .map(|err| panic!("Receive loop terminated: {}", err))
/// # );
/// #
/// # let future = async move {
/// // Create a remote endpoint instance to represent the
/// // device we wish to interact with.
/// let remote_endpoint = local_endpoint
///     .remote_endpoint_from_uri(uri!("coap://coap.me"))
///     .unwrap(); // Will only fail if the URI scheme or authority is unrecognizable
///
/// // Create a future that sends a request to a specific path
/// // on the remote endpoint, collecting any blocks in the response
/// // and returning `Ok(OwnedImmutableMessage)` upon success.
/// let future = remote_endpoint.send_to(
///     rel_ref!("large"),
///     CoapRequest::get()       // This is a CoAP GET request
///         .accept(ContentFormat::TEXT_PLAIN_UTF8) // We only want plaintext
///         .block2(Some(Default::default()))       // Enable block2 processing
///         .emit_successful_collected_response()                 // Collect all blocks into a single message
/// );
///
/// // Wait for the final result and print it.
/// println!("result: {:?}", future.await.unwrap());
/// # };
/// #
/// # pool.run_until(future);
/// ```
///
pub trait RemoteEndpoint {
    /// The `SocketAddr` type to use with this local endpoint. This is usually
    /// simply `std::net::SocketAddr`, but may be different in some cases (like for CoAP-SMS
    /// endpoints).
    type SocketAddr: SocketAddrExt;

    /// Type used by closure that is passed into `send()`, representing the context for the
    /// response.
    type InboundContext: InboundContext<SocketAddr = Self::SocketAddr>;

    /// Returns a [`UriBuf`] describing the underlying destination of this remote endpoint.
    fn uri(&self) -> UriBuf;

    /// Returns a string slice containing the scheme for this `RemoteEndpoint`.
    fn scheme(&self) -> &'static str;

    /// Prevents this remote endpoint from including a `Uri-Host` option.
    fn remove_host_option(&mut self);

    /// Creates a clone of this `RemoteEndpoint` with a different relative path.
    fn clone_using_rel_ref(&self, uri: &RelRef) -> Self;

    /// Uses `send_desc` to send a request to the endpoint and path described by this
    /// `RemoteEndpoint` instance.
    fn send<'a, R, SD>(&'a self, send_desc: SD) -> BoxFuture<'_, Result<R, Error>>
    where
        SD: SendDesc<Self::InboundContext, R> + 'a,
        R: Send + 'a;

    /// Uses `send_desc` to send a request to the given relative path on the endpoint described
    /// by this `RemoteEndpoint` instance.
    fn send_to<'a, R, SD, UF>(&'a self, path: UF, send_desc: SD) -> BoxFuture<'_, Result<R, Error>>
    where
        SD: SendDesc<Self::InboundContext, R> + 'a,
        R: Send + 'a,
        UF: AsRef<RelRef>;
}

/// Extension trait which implements additional helper methods.
pub trait RemoteEndpointExt: RemoteEndpoint {
    /// Sends an application-level ping to to one or more addresses specified by `dest`.
    /// The first response received causes the future to emit `Ok(())`.
    fn ping(&self) -> BoxFuture<'_, Result<(), Error>> {
        self.send(Ping::new())
    }

    /// Sends a GET request to `path`, returning the response message on success.
    fn get<'a, UF>(
        &'a self,
        path: UF,
        opts: RequestOptions,
    ) -> BoxFuture<'a, Result<OwnedImmutableMessage, Error>>
    where
        UF: AsRef<RelRef> + 'a,
    {
        self.send_to(
            path,
            CoapRequest::get()
                .add_option_iter(option::ACCEPT, opts.accept.into_iter())
                .add_option_iter(option::IF_MATCH, opts.if_match.into_iter())
                .add_option_iter(option::IF_NONE_MATCH, if_none_match_iter(opts.if_none_match))
                .emit_successful_response(),
        )
    }

    /// Sends a POST request to `path` with the given `payload`, returning the response message
    /// on success.
    fn post<'a, UF>(
        &'a self,
        path: UF,
        payload: Vec<u8>,
        opts: RequestOptions,
    ) -> BoxFuture<'a, Result<OwnedImmutableMessage, Error>>
    where
        UF: AsRef<RelRef> + 'a,
    {
        let send_desc = CoapRequest::post()
            .add_option_iter(option::CONTENT_FORMAT, opts.content_format.into_iter())
            .add_option_iter(option::ACCEPT, opts.accept.into_iter())
            .add_option_iter(option::IF_MATCH, opts.if_match.into_iter())
            .add_option_iter(option::IF_NONE_MATCH, if_none_match_iter(opts.if_none_match));

        let send_desc = WithPayload::new(send_desc, move |msg: &mut dyn MessageWrite| {
            msg.append_payload_bytes(&payload)
        });

        self.send_to(path, send_desc.emit_successful_response())
    }

    /// Sends a PUT request to `path` with the given `payload`, returning the response message
    /// on success.
    fn put<'a, UF>(
        &'a self,
        path: UF,
        payload: Vec<u8>,
        opts: RequestOptions,
    ) -> BoxFuture<'a, Result<OwnedImmutableMessage, Error>>
    where
        UF: AsRef<RelRef> + 'a,
    {
        let send_desc = CoapRequest::put()
            .add_option_iter(option::CONTENT_FORMAT, opts.content_format.into_iter())
            .add_option_iter(option::ACCEPT, opts.accept.into_iter())
            .add_option_iter(option::IF_MATCH, opts.if_match.into_iter())
            .add_option_iter(option::IF_NONE_MATCH, if_none_match_iter(opts.if_none_match));

        let send_desc = WithPayload::new(send_desc, move |msg: &mut dyn MessageWrite| {
            msg.append_payload_bytes(&payload)
        });

        self.send_to(path, send_desc.emit_successful_response())
    }

    /// Sends a DELETE request to `path`, returning the response message on success.
    fn delete<'a, UF>(
        &'a self,
        path: UF,
        opts: RequestOptions,
    ) -> BoxFuture<'a, Result<OwnedImmutableMessage, Error>>
    where
        UF: AsRef<RelRef> + 'a,
    {
        self.send_to(
            path,
            CoapRequest::delete()
                .add_option_iter(option::IF_MATCH, opts.if_match.into_iter())
                .add_option_iter(option::IF_NONE_MATCH, if_none_match_iter(opts.if_none_match))
                .emit_successful_response(),
        )
    }

    /// Observes `path`, emitting a new [`OwnedImmutableMessage`] into the returned stream for
    /// each fresh notification. Stale/out-of-order notifications (per [RFC 7641 Section 3.4])
    /// are filtered out before they reach the stream.
    ///
    /// [RFC 7641 Section 3.4]: https://tools.ietf.org/html/rfc7641#section-3.4
    fn observe<'a, UF>(
        &'a self,
        path: UF,
        accept: Option<ContentFormat>,
    ) -> SendAsStream<'a, OwnedImmutableMessage>
    where
        UF: AsRef<RelRef>,
    {
        self.send_to_as_stream(
            path,
            CoapRequest::observe().add_option_iter(option::ACCEPT, accept.into_iter()),
        )
    }

    /// Performs [RFC 6690] resource discovery against `/.well-known/core`, optionally filtered
    /// by a resource-type/interface `query` (e.g. `"rt=temperature"`).
    ///
    /// Returns `Ok(None)` if the request timed out, and `Ok(Some(links))` otherwise: `links` is
    /// empty if the response was missing, had the wrong content-format, or was not valid UTF-8.
    ///
    /// [RFC 6690]: https://tools.ietf.org/html/rfc6690
    fn discover<'a>(
        &'a self,
        query: Option<&'a str>,
    ) -> BoxFuture<'a, Result<Option<Vec<WebLink>>, Error>> {
        let future = self.send_to(
            rel_ref!(".well-known/core"),
            CoapRequest::get()
                .accept(ContentFormat::APPLICATION_LINK_FORMAT)
                .add_option_iter(option::URI_QUERY, query.into_iter())
                .emit_successful_response(),
        );

        async move {
            match future.await {
                Ok(msg) => {
                    if msg.content_format() != Some(ContentFormat::APPLICATION_LINK_FORMAT) {
                        return Ok(Some(Vec::new()));
                    }
                    match core::str::from_utf8(msg.payload()) {
                        Ok(doc) => Ok(Some(WebLink::parse_document(doc))),
                        Err(_) => Ok(Some(Vec::new())),
                    }
                }
                Err(Error::ResponseTimeout) => Ok(None),
                Err(err) => Err(err),
            }
        }
        .boxed()
    }

    /// Analogous to [`LocalEndpointExt::send_as_stream`], except using this `RemoteEndpoint` for
    /// the destination SocketAddr and path.
    fn send_as_stream<'a, R, SD>(&'a self, send_desc: SD) -> SendAsStream<'a, R>
    where
        SD: SendDesc<Self::InboundContext, R> + 'a,
        R: Send + 'a,
    {
        let (sender, receiver) = futures::channel::mpsc::channel::<Result<R, Error>>(10);

        SendAsStream {
            receiver,
            send_future: self.send(SendAsStreamDesc::new(send_desc, sender)),
        }
    }

    /// Analogous to [`LocalEndpointExt::send_as_stream`], except using this `RemoteEndpoint` for
    /// the destination SocketAddr and using a path relative to this `RemoteEndpoint`.
    fn send_to_as_stream<'a, R, SD, UF>(&'a self, path: UF, send_desc: SD) -> SendAsStream<'a, R>
    where
        SD: SendDesc<Self::InboundContext, R> + 'a,
        R: Send + 'a,
        UF: AsRef<RelRef>,
    {
        let (sender, receiver) = futures::channel::mpsc::channel::<Result<R, Error>>(10);

        SendAsStream {
            receiver,
            send_future: self.send_to(path, SendAsStreamDesc::new(send_desc, sender)),
        }
    }
}

/// Blanket implementation of `RemoteEndpointExt` for all `RemoteEndpoint` instances.
impl<T: RemoteEndpoint> RemoteEndpointExt for T {}
