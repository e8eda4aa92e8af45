use super::users::UserId;

/// Directed edge: `user_following_id` follows `user_being_followed_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Follows {
    pub user_being_followed_id: UserId,
    pub user_following_id: UserId,
}

impl Follows {
    pub fn new(follower: UserId, followed: UserId) -> Self {
        Self {
            user_being_followed_id: followed,
            user_following_id: follower,
        }
    }

    pub fn is_self_follow(&self) -> bool {
        self.user_being_followed_id == self.user_following_id
    }
}

#[derive(Debug, Clone, Default)]
pub struct FollowsFilter {
    pub user_being_followed_id: Option<UserId>,
    pub user_following_id: Option<UserId>,
}

impl FollowsFilter {
    pub fn matches(&self, f: &Follows) -> bool {
        self.user_being_followed_id
            .is_none_or(|id| id == f.user_being_followed_id)
            && self
                .user_following_id
                .is_none_or(|id| id == f.user_following_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_orders_follower_and_followed() {
        let f = Follows::new(1, 2);
        assert_eq!(f.user_following_id, 1);
        assert_eq!(f.user_being_followed_id, 2);
        assert!(!f.is_self_follow());
        assert!(Follows::new(3, 3).is_self_follow());
    }

    #[test]
    fn filter_matches_on_each_side() {
        let f = Follows::new(1, 2);
        assert!(FollowsFilter::default().matches(&f));
        let by_follower = FollowsFilter {
            user_following_id: Some(1),
            ..Default::default()
        };
        assert!(by_follower.matches(&f));
        let wrong = FollowsFilter {
            user_being_followed_id: Some(1),
            ..Default::default()
        };
        assert!(!wrong.matches(&f));
    }
}
