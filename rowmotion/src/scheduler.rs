use crate::{
    AnimatedItems, AnimationHandle, AnimationOptions, AnimationRegistry, AnimationSet,
    ElementTag, Error, HostViewport, VisibleWindow, VisualElement,
};

/// Decides, per bound position, whether and when to play an entrance animation.
///
/// The scheduler sits between the host list and its content provider. Every bind goes through
/// [`AnimationScheduler::request_element`], which:
/// 1. ends the animation started on the reused element's previous bind (if it is still
///    registered for that element),
/// 2. asks the provider for the bound element and tags it with the new position,
/// 3. animates it if the position is past the last animated one.
///
/// Each position animates at most once until [`AnimationScheduler::reset`].
///
/// The host is configured with [`AnimationScheduler::set_host`]; rendering before that is a
/// usage error. Time is adapter-driven: every call takes `now_ms`.
pub struct AnimationScheduler<P: AnimatedItems, H = VisibleWindow> {
    items: P,
    host: Option<H>,
    options: AnimationOptions,
    registry: AnimationRegistry<AnimationSet<P::Animation>>,
    animation_start_ms: Option<u64>,
    last_animated_position: Option<usize>,
    next_generation: u64,
}

impl<P: AnimatedItems, H: HostViewport> AnimationScheduler<P, H> {
    pub fn new(items: P) -> Self {
        Self::with_options(items, AnimationOptions::default())
    }

    pub fn with_options(items: P, options: AnimationOptions) -> Self {
        Self {
            items,
            host: None,
            options,
            registry: AnimationRegistry::new(),
            animation_start_ms: None,
            last_animated_position: before(options.animate_from_position),
            next_generation: 0,
        }
    }

    pub fn set_host(&mut self, host: H) {
        self.host = Some(host);
    }

    pub fn host(&self) -> Option<&H> {
        self.host.as_ref()
    }

    pub fn host_mut(&mut self) -> Option<&mut H> {
        self.host.as_mut()
    }

    pub fn items(&self) -> &P {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut P {
        &mut self.items
    }

    pub fn options(&self) -> &AnimationOptions {
        &self.options
    }

    /// Enables or disables entrance animations. Running animations are left alone.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.options.enabled = enabled;
    }

    /// Only positions `>= position` animate from now on.
    pub fn set_animate_from_position(&mut self, position: usize) {
        self.options.animate_from_position = Some(position);
        self.last_animated_position = position.checked_sub(1);
    }

    /// Ends every registered animation and starts a fresh activation.
    pub fn reset(&mut self) {
        rdebug!(
            registered = self.registry.len(),
            "AnimationScheduler::reset"
        );
        self.registry.end_all();
        self.animation_start_ms = None;
        self.last_animated_position = before(self.options.animate_from_position);
    }

    /// The highest position animated in this activation.
    pub fn last_animated_position(&self) -> Option<usize> {
        self.last_animated_position
    }

    /// Timestamp of the first animation in this activation.
    pub fn animation_start_ms(&self) -> Option<u64> {
        self.animation_start_ms
    }

    pub fn registry(&self) -> &AnimationRegistry<AnimationSet<P::Animation>> {
        &self.registry
    }

    pub fn is_animating(&self, position: usize) -> bool {
        self.registry
            .get(position)
            .is_some_and(|h| h.state().is_running())
    }

    /// Drops registry entries whose animation already finished.
    pub fn prune_finished(&mut self) -> usize {
        self.registry.prune_finished()
    }

    /// Binds an element for `position`.
    ///
    /// # Panics
    ///
    /// Panics if no host was configured with [`AnimationScheduler::set_host`].
    pub fn request_element(
        &mut self,
        position: usize,
        reusable: Option<P::Element>,
        parent: &P::Parent,
        now_ms: u64,
    ) -> P::Element {
        match self.try_request_element(position, reusable, parent, now_ms) {
            Ok(element) => element,
            Err(err) => panic!("{err}"),
        }
    }

    /// Fallible form of [`AnimationScheduler::request_element`].
    pub fn try_request_element(
        &mut self,
        position: usize,
        reusable: Option<P::Element>,
        parent: &P::Parent,
        now_ms: u64,
    ) -> Result<P::Element, Error> {
        let window = self
            .host
            .as_ref()
            .map(HostViewport::visible_window)
            .ok_or(Error::HostNotConfigured)?;
        if window.last < window.first {
            rwarn!(
                first = window.first,
                last = window.last,
                "AnimationScheduler: host reported an inverted visible window"
            );
        }

        let previous = reusable.as_ref().and_then(VisualElement::tag);
        rtrace!(position, previous = ?previous, "AnimationScheduler::request_element");
        if let Some(tag) = previous {
            self.registry.end_for_tag(tag);
        }

        let mut element = self.items.item_element(position, reusable, parent);
        let tag = ElementTag {
            position,
            generation: self.bump_generation(),
        };
        element.set_tag(tag);

        if self.should_animate(position) {
            self.animate(tag, &mut element, parent, window, now_ms);
        }
        Ok(element)
    }

    fn bump_generation(&mut self) -> u64 {
        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);
        generation
    }

    fn should_animate(&self, position: usize) -> bool {
        self.options.enabled
            && self
                .last_animated_position
                .is_none_or(|last| position > last)
    }

    fn animate(
        &mut self,
        tag: ElementTag,
        element: &mut P::Element,
        parent: &P::Parent,
        window: VisibleWindow,
        now_ms: u64,
    ) {
        let start_ms = *self.animation_start_ms.get_or_insert(now_ms);

        element.set_opacity(0.0);

        let mut animators = self.items.animators(parent, element);
        animators.push(self.items.fade_in(element));
        let mut set = AnimationSet::new(animators);

        let delay_ms = self.animation_delay(window, start_ms, now_ms);
        rtrace!(
            position = tag.position,
            delay_ms,
            members = set.len(),
            "AnimationScheduler: starting entrance animation"
        );
        set.start(delay_ms);

        self.registry.insert(tag, set);
        self.last_animated_position = Some(tag.position);
    }

    /// Staggers animations while the list fills its first screen; once the last animated
    /// position is past that (e.g. after a fling) every item waits a single fixed step.
    fn animation_delay(&self, window: VisibleWindow, start_ms: u64, now_ms: u64) -> u64 {
        let per_item = self.items.animation_delay_ms();
        match self.last_animated_position {
            Some(last) if window.span().saturating_add(1) < last => per_item,
            last => {
                let animated = last.map_or(0, |p| p as u64 + 1);
                start_ms
                    .saturating_add(self.options.initial_delay_ms)
                    .saturating_add(animated.saturating_mul(per_item))
                    .saturating_sub(now_ms)
            }
        }
    }
}

fn before(position: Option<usize>) -> Option<usize> {
    position.and_then(|p| p.checked_sub(1))
}

impl<P: AnimatedItems, H> core::fmt::Debug for AnimationScheduler<P, H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AnimationScheduler")
            .field("host_configured", &self.host.is_some())
            .field("options", &self.options)
            .field("registry", &self.registry)
            .field("animation_start_ms", &self.animation_start_ms)
            .field("last_animated_position", &self.last_animated_position)
            .finish_non_exhaustive()
    }
}
