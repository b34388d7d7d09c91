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

impl<SD: SendDescUnicast, F> SendDescUnicast for WithPayload<SD, F> {}
impl<SD: SendDescMulticast, F> SendDescMulticast for WithPayload<SD, F> {}

/// Combinator that appends bytes to the outbound payload *after* the inner descriptor has
/// written whatever it normally writes (notably the message code set by
/// [`CoapRequest::post`]/[`CoapRequest::put`]).
///
/// This differs from [`PayloadWriter`], which replaces `write_payload` entirely and is meant to
/// be the innermost descriptor in a chain. `WithPayload` is used internally by the client facade
/// (`RemoteEndpointExt::post`/`put`) to attach a caller-supplied request body on top of an
/// existing method send descriptor without losing that descriptor's own `write_payload` work.
#[derive(Debug)]
pub(crate) struct WithPayload<SD, F> {
    inner: SD,
    writer: F,
}

impl<SD, F> WithPayload<SD, F> {
    pub(crate) fn new(inner: SD, writer: F) -> WithPayload<SD, F> {
        WithPayload { inner, writer }
    }
}

impl<SD, F, IC> SendDesc<IC, ()> for WithPayload<SD, F>
where
    SD: SendDesc<IC, ()> + Send,
    IC: InboundContext,
    F: Fn(&mut dyn MessageWrite) -> Result<(), Error> + Send,
{
    send_desc_passthru_timing!(inner);
    send_desc_passthru_options!(inner);
    send_desc_passthru_handler!(inner);

    fn write_payload(
        &self,
        msg: &mut dyn MessageWrite,
        socket_addr: &IC::SocketAddr,
    ) -> Result<(), Error> {
        self.inner.write_payload(msg, socket_addr)?;
        (self.writer)(msg)
    }
}
